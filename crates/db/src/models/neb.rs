//! Nudged elastic band path entities.

use m4db_core::running_status::RunningStatus;
use m4db_core::types::{DbId, Timestamp, UniqueId};
use serde::{Deserialize, Serialize};

/// A NEB path between two models, optionally refining a parent path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Neb {
    pub id: DbId,
    pub unique_id: UniqueId,
    pub start_model_unique_id: UniqueId,
    pub end_model_unique_id: UniqueId,
    pub parent_neb_unique_id: Option<UniqueId>,
    pub running_status: RunningStatus,
    pub spring_constant: Option<f64>,
    pub curvature_weight: Option<f64>,
    pub no_of_points: Option<i64>,
    pub max_energy_evaluations: i64,
    pub max_path_evaluations: i64,
    /// Energy barrier in Joules, once computed.
    pub energy_barrier: Option<f64>,
    pub created: Timestamp,
    pub last_modified: Timestamp,
}

/// DTO for `POST /neb`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CreateNeb {
    pub start_model_unique_id: UniqueId,
    pub end_model_unique_id: UniqueId,
    pub parent_neb_unique_id: Option<UniqueId>,
    pub spring_constant: Option<f64>,
    pub curvature_weight: Option<f64>,
    pub no_of_points: Option<i64>,
    pub max_energy_evaluations: Option<i64>,
    pub max_path_evaluations: Option<i64>,
}
