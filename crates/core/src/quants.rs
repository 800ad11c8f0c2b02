//! Result quantities of a finished model.
//!
//! Every field is optional: a `set-quants` payload carries any subset, and
//! [`ModelQuants::merge`] only overwrites the fields that are present, so
//! applying the same payload twice is a no-op the second time.

use serde::{Deserialize, Serialize};

/// Derived and reported quantities of a model run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModelQuants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_tot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_tot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mz_tot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx_tot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy_tot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vz_tot: Option<f64>,
    /// Total helicity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_tot: Option<f64>,
    /// Total relative helicity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rh_tot: Option<f64>,
    /// Total anisotropy-direction-of-moments metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adm_tot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_typical: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_anis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_ext: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_demag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_exch1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_exch2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_exch3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_exch4: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_tot: Option<f64>,
    /// Total mesh volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl ModelQuants {
    /// Overwrite every field that is set in `update`, leaving the rest.
    pub fn merge(&mut self, update: &ModelQuants) {
        for (dst, src) in self.fields_mut().into_iter().zip(update.fields()) {
            if let Some(value) = src {
                *dst = Some(value);
            }
        }
    }

    /// Number of fields that carry a value.
    pub fn populated_count(&self) -> usize {
        self.fields().iter().filter(|f| f.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    /// The nine energy terms, in report order.
    pub fn energies(&self) -> [Option<f64>; 9] {
        [
            self.e_typical,
            self.e_anis,
            self.e_ext,
            self.e_demag,
            self.e_exch1,
            self.e_exch2,
            self.e_exch3,
            self.e_exch4,
            self.e_tot,
        ]
    }

    fn fields(&self) -> [Option<f64>; 19] {
        [
            self.mx_tot,
            self.my_tot,
            self.mz_tot,
            self.vx_tot,
            self.vy_tot,
            self.vz_tot,
            self.h_tot,
            self.rh_tot,
            self.adm_tot,
            self.e_typical,
            self.e_anis,
            self.e_ext,
            self.e_demag,
            self.e_exch1,
            self.e_exch2,
            self.e_exch3,
            self.e_exch4,
            self.e_tot,
            self.volume,
        ]
    }

    fn fields_mut(&mut self) -> [&mut Option<f64>; 19] {
        [
            &mut self.mx_tot,
            &mut self.my_tot,
            &mut self.mz_tot,
            &mut self.vx_tot,
            &mut self.vy_tot,
            &mut self.vz_tot,
            &mut self.h_tot,
            &mut self.rh_tot,
            &mut self.adm_tot,
            &mut self.e_typical,
            &mut self.e_anis,
            &mut self.e_ext,
            &mut self.e_demag,
            &mut self.e_exch1,
            &mut self.e_exch2,
            &mut self.e_exch3,
            &mut self.e_exch4,
            &mut self.e_tot,
            &mut self.volume,
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
