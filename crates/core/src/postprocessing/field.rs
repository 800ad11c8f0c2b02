//! Volume integrals of nodal fields over a tetrahedral mesh.

use super::tecplot::TecplotZone;
use super::PostProcessError;
use crate::quants::ModelQuants;

/// Variables every field file must carry, in integration order after the
/// three coordinates.
pub const REQUIRED_VARIABLES: [&str; 12] = [
    "X", "Y", "Z", "Mx", "My", "Mz", "Vx", "Vy", "Vz", "H", "RH", "ADM",
];

/// Integrated quantities of a loaded field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetQuantities {
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub h: f64,
    pub rh: f64,
    pub adm: f64,
    pub volume: f64,
}

impl NetQuantities {
    pub fn apply_to(&self, quants: &mut ModelQuants) {
        quants.mx_tot = Some(self.mx);
        quants.my_tot = Some(self.my);
        quants.mz_tot = Some(self.mz);
        quants.vx_tot = Some(self.vx);
        quants.vy_tot = Some(self.vy);
        quants.vz_tot = Some(self.vz);
        quants.h_tot = Some(self.h);
        quants.rh_tot = Some(self.rh);
        quants.adm_tot = Some(self.adm);
        quants.volume = Some(self.volume);
    }
}

/// Volume of the tetrahedron spanned by four points.
pub fn tetrahedron_volume(p: [[f64; 3]; 4]) -> f64 {
    let a = sub(p[1], p[0]);
    let b = sub(p[2], p[0]);
    let c = sub(p[3], p[0]);
    let det = a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
        + a[2] * (b[0] * c[1] - b[1] * c[0]);
    det.abs() / 6.0
}

fn sub(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [u[0] - v[0], u[1] - v[1], u[2] - v[2]]
}

/// Integrate every required field over the zone.
///
/// Each element contributes its volume times the mean of its four nodal
/// values.
pub fn net_quantities(zone: &TecplotZone) -> Result<NetQuantities, PostProcessError> {
    let mut columns = [0usize; 12];
    for (column, name) in columns.iter_mut().zip(REQUIRED_VARIABLES) {
        *column = zone
            .variable_index(name)
            .ok_or(PostProcessError::MissingVariable(name))?;
    }
    let [x, y, z, fields @ ..] = columns;

    let mut sums = [0.0f64; 9];
    let mut volume = 0.0;
    for tet in &zone.connectivity {
        let rows = tet.map(|node| &zone.values[node]);
        let element_volume = tetrahedron_volume(rows.map(|row| [row[x], row[y], row[z]]));
        volume += element_volume;
        for (sum, column) in sums.iter_mut().zip(fields) {
            let mean = rows.iter().map(|row| row[column]).sum::<f64>() / 4.0;
            *sum += element_volume * mean;
        }
    }

    let [mx, my, mz, vx, vy, vz, h, rh, adm] = sums;
    Ok(NetQuantities {
        mx,
        my,
        mz,
        vx,
        vy,
        vz,
        h,
        rh,
        adm,
        volume,
    })
}
