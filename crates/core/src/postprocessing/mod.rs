//! Post-processing of solver output.
//!
//! [`merrill_stdout`] decides whether a run completed and pulls the energy
//! report out of its standard output; [`tecplot`] loads the field output
//! into an unstructured tetrahedral grid; [`field`] integrates nodal fields
//! over that grid.

pub mod field;
pub mod merrill_stdout;
pub mod tecplot;

use std::path::PathBuf;

/// Errors raised while interpreting solver output.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    /// The completion sentinel is missing from standard output.
    #[error("Solver output is incomplete: sentinel '{sentinel}' not found")]
    SolverIncomplete { sentinel: String },

    /// A term of the energy report could not be found.
    #[error("Energy term '{0}' missing from solver output")]
    MissingEnergy(&'static str),

    /// A value in the energy report is not a number.
    #[error("Energy term '{term}' has unparseable value '{value}'")]
    BadEnergy { term: &'static str, value: String },

    /// The field file does not follow the expected Tecplot layout.
    #[error("Malformed Tecplot data at line {line}: {message}")]
    Tecplot { line: usize, message: String },

    /// A variable required for the derived quantities is absent.
    #[error("Tecplot output lacks required variable '{0}'")]
    MissingVariable(&'static str),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a float that may use a Fortran `D` exponent (`1.5D-03`).
pub(crate) fn parse_fortran_float(raw: &str) -> Option<f64> {
    raw.replace(['d', 'D'], "E").parse().ok()
}
