//! MERRILL script rendering.
//!
//! The coordinator renders a model's solver script from its parameters and
//! hands the text to runners verbatim; runners never inspect it. File names
//! referenced by the script are the canonical job file names, and a parent
//! model's field is read from the directory the runner unpacks it into.

use std::fmt::Write;

use crate::directories::{GEOMETRY_PATRAN_FILE_NAME, MAGNETIZATION_TECPLOT_FILE_NAME};
use crate::magnetization::InitialMagnetization;
use crate::types::UniqueId;

/// Output stem passed to `WriteMagnetization`; MERRILL appends `.tec`.
pub const MAGNETIZATION_OUTPUT_STEM: &str = "magnetization";

/// Energy minimizer used for every model.
pub const DEFAULT_ENERGY_MINIMIZER: &str = "ConjugateGradient";

/// Exchange energy calculator used for every model.
pub const DEFAULT_EXCHANGE_CALCULATOR: u32 = 1;

/// A material on one submesh, as the solver names it.
#[derive(Debug, Clone)]
pub struct ScriptMaterial {
    pub submesh_id: u32,
    pub name: String,
    pub temperature: f64,
}

/// Everything the script depends on.
#[derive(Debug, Clone)]
pub struct ModelScriptParams {
    pub unique_id: UniqueId,
    pub materials: Vec<ScriptMaterial>,
    pub initial_magnetization: InitialMagnetization,
    pub max_energy_evaluations: i64,
}

/// Render the MERRILL script for a single model.
pub fn render_model_script(params: &ModelScriptParams) -> String {
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "! M4DB model {}", params.unique_id);
    let _ = writeln!(out, "Set MaxMeshNumber 1");
    let _ = writeln!(out, "ReadMesh 1 {GEOMETRY_PATRAN_FILE_NAME}");
    for material in &params.materials {
        let _ = writeln!(
            out,
            "{} {} C SubDomain {}",
            material.name, material.temperature, material.submesh_id
        );
    }
    let _ = writeln!(
        out,
        "Set MaxEnergyEvaluations {}",
        params.max_energy_evaluations
    );
    let _ = writeln!(out, "Set ExchangeCalculator {DEFAULT_EXCHANGE_CALCULATOR}");
    let _ = writeln!(out, "EnergyLog energy");

    match &params.initial_magnetization {
        InitialMagnetization::Uniform {
            dir_x,
            dir_y,
            dir_z,
            magnitude,
        } => {
            let _ = writeln!(out, "Uniform Magnetization {dir_x} {dir_y} {dir_z}");
            let _ = writeln!(out, "External Field Strength {magnitude} muT");
            let _ = writeln!(out, "External Field Direction {dir_x} {dir_y} {dir_z}");
        }
        InitialMagnetization::Random => {
            let _ = writeln!(out, "Randomize All Moments");
        }
        InitialMagnetization::ModelRef { unique_id } => {
            let _ = writeln!(
                out,
                "ReadMagnetization {unique_id}/{MAGNETIZATION_TECPLOT_FILE_NAME}"
            );
        }
    }

    let _ = writeln!(out, "Minimizer {DEFAULT_ENERGY_MINIMIZER}");
    let _ = writeln!(out, "EnergyMin");
    let _ = writeln!(out, "WriteMagnetization {MAGNETIZATION_OUTPUT_STEM}");
    let _ = writeln!(out, "CloseLogFile");
    let _ = writeln!(out, "End");
    out
}
