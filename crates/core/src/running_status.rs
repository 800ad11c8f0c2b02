//! Model and NEB lifecycle stages.
//!
//! The wire representation is the kebab-case name (`not-run`, `re-run`,
//! ...). The job runner only ever writes `running`, `re-run` and
//! `finished`; `scheduled` and `crashed` belong to external schedulers and
//! operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle stage of a model or NEB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunningStatus {
    NotRun,
    Scheduled,
    Running,
    ReRun,
    Crashed,
    Finished,
}

/// Every status, in lifecycle order.
pub const ALL_RUNNING_STATUSES: [RunningStatus; 6] = [
    RunningStatus::NotRun,
    RunningStatus::Scheduled,
    RunningStatus::Running,
    RunningStatus::ReRun,
    RunningStatus::Crashed,
    RunningStatus::Finished,
];

impl RunningStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRun => "not-run",
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::ReRun => "re-run",
            Self::Crashed => "crashed",
            Self::Finished => "finished",
        }
    }

    /// Whether dependants may consume this job's quants and archive.
    pub fn is_finished(self) -> bool {
        self == Self::Finished
    }
}

impl fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunningStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_RUNNING_STATUSES
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid running status '{s}'. Must be one of: {}",
                    ALL_RUNNING_STATUSES.map(RunningStatus::as_str).join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
