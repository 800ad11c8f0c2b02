//! Micromagnetic model entities.

use m4db_core::magnetization::InitialMagnetization;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::script::ModelScriptParams;
use m4db_core::types::{DbId, Timestamp, UniqueId};
use serde::{Deserialize, Serialize};

use super::geometry::Geometry;

/// Default energy evaluation budget of a model run.
pub const DEFAULT_MAX_ENERGY_EVALUATIONS: i64 = 10_000;

/// Assignment of a material to one submesh of the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubmeshMaterial {
    pub submesh_id: u32,
    pub material_id: DbId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: DbId,
    pub unique_id: UniqueId,
    pub running_status: RunningStatus,
    pub initial_magnetization: InitialMagnetization,
    pub geometry_id: DbId,
    pub materials: Vec<SubmeshMaterial>,
    pub max_energy_evaluations: i64,
    /// Overrides the coordinator's default solver executable.
    pub solver_executable: Option<String>,
    #[serde(default)]
    pub quants: ModelQuants,
    pub created: Timestamp,
    pub last_modified: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateModel {
    pub unique_id: Option<UniqueId>,
    pub geometry_id: DbId,
    pub materials: Vec<SubmeshMaterial>,
    pub initial_magnetization: InitialMagnetization,
    pub max_energy_evaluations: Option<i64>,
    pub solver_executable: Option<String>,
}

/// Everything the coordinator needs to describe a run of one model.
#[derive(Debug, Clone)]
pub struct ModelRunContext {
    pub model: Model,
    pub geometry: Geometry,
    pub script: ModelScriptParams,
    /// Status of the parent model when the model starts from one.
    pub parent_status: Option<RunningStatus>,
}
