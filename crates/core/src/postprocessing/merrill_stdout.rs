//! MERRILL standard output interpretation.
//!
//! A run is complete iff its standard output contains the completion
//! sentinel; the exit code carries no information. The energy report is a
//! block of `<label> <value>` lines:
//!
//! ```text
//!  Energies in units of Kd V:   1.6023E-17
//!  E-Anis       -0.0021
//!  E-ext         0.0000
//!  E-Demag       0.1342
//!  E-Exch        0.4123
//!  E-Exch2       0.4120
//!  E-Exch3       0.4119
//!  E-Exch4       0.4125
//!  E-Tot         0.5444
//! ```
//!
//! The solver may print the block more than once; the last value wins.

use std::sync::LazyLock;

use regex::Regex;

use super::{parse_fortran_float, PostProcessError};
use crate::quants::ModelQuants;

/// Line printed by the solver once the script ran to the end.
pub const DEFAULT_COMPLETION_SENTINEL: &str = "Merrill script run complete";

const VALUE: &str = r"(?P<v>[-+0-9.][-+0-9.eEdD]*)";

static TERM_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("typical", r"Energies in units of Kd V"),
        ("anis", r"E-Anis"),
        ("ext", r"E-ext"),
        ("demag", r"E-Demag"),
        ("exch1", r"E-Exch"),
        ("exch2", r"E-Exch2"),
        ("exch3", r"E-Exch3"),
        ("exch4", r"E-Exch4"),
        ("tot", r"E-Tot"),
    ]
    .into_iter()
    .map(|(term, label)| {
        let pattern = format!(r"(?im)^\s*{label}\s*[:=]?\s*{VALUE}\s*$");
        (term, Regex::new(&pattern).expect("valid regex"))
    })
    .collect()
});

/// Whether `stdout` contains the completion sentinel on any line.
pub fn is_finished(stdout: &str, sentinel: &str) -> bool {
    stdout.lines().any(|line| line.contains(sentinel))
}

/// Fail with [`PostProcessError::SolverIncomplete`] unless the run finished.
pub fn ensure_finished(stdout: &str, sentinel: &str) -> Result<(), PostProcessError> {
    if is_finished(stdout, sentinel) {
        Ok(())
    } else {
        Err(PostProcessError::SolverIncomplete {
            sentinel: sentinel.to_string(),
        })
    }
}

/// The nine energy terms of a MERRILL report.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    /// Typical system energy in Joules (the unit of every other term).
    pub typical: f64,
    pub anis: f64,
    pub ext: f64,
    pub demag: f64,
    pub exch1: f64,
    pub exch2: f64,
    pub exch3: f64,
    pub exch4: f64,
    pub tot: f64,
}

impl EnergyReport {
    /// Copy the energies into the matching quant fields.
    pub fn apply_to(&self, quants: &mut ModelQuants) {
        quants.e_typical = Some(self.typical);
        quants.e_anis = Some(self.anis);
        quants.e_ext = Some(self.ext);
        quants.e_demag = Some(self.demag);
        quants.e_exch1 = Some(self.exch1);
        quants.e_exch2 = Some(self.exch2);
        quants.e_exch3 = Some(self.exch3);
        quants.e_exch4 = Some(self.exch4);
        quants.e_tot = Some(self.tot);
    }
}

/// Extract the energy report from solver standard output.
pub fn parse_energy_report(stdout: &str) -> Result<EnergyReport, PostProcessError> {
    let mut values = [0.0f64; 9];
    for (slot, (term, regex)) in values.iter_mut().zip(TERM_PATTERNS.iter()) {
        let raw = regex
            .captures_iter(stdout)
            .last()
            .and_then(|caps| caps.name("v"))
            .ok_or(PostProcessError::MissingEnergy(term))?
            .as_str();
        *slot = parse_fortran_float(raw).ok_or_else(|| PostProcessError::BadEnergy {
            term,
            value: raw.to_string(),
        })?;
    }

    let [typical, anis, ext, demag, exch1, exch2, exch3, exch4, tot] = values;
    Ok(EnergyReport {
        typical,
        anis,
        ext,
        demag,
        exch1,
        exch2,
        exch3,
        exch4,
        tot,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
