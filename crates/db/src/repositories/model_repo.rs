//! Repository for models.
//!
//! Status writes are permissive: any status may follow any other. A caller
//! that needs a guard passes the status it expects to replace.

use m4db_core::error::CoreError;
use m4db_core::magnetization::InitialMagnetization;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::script::{ModelScriptParams, ScriptMaterial};
use m4db_core::types::UniqueId;

use super::{GeometryRepo, MaterialRepo};
use crate::models::model::{CreateModel, Model, ModelRunContext, DEFAULT_MAX_ENERGY_EVALUATIONS};
use crate::registry::Tables;

fn not_found(unique_id: &UniqueId) -> CoreError {
    CoreError::not_found("model", unique_id)
}

pub struct ModelRepo;

impl ModelRepo {
    /// Insert a new `not-run` model after checking its references.
    pub fn insert(tables: &mut Tables, input: CreateModel) -> Result<Model, CoreError> {
        GeometryRepo::find(tables, input.geometry_id)?;
        for assignment in &input.materials {
            MaterialRepo::find(tables, assignment.material_id)?;
        }
        if let Some(parent) = input.initial_magnetization.parent() {
            Self::find(tables, &parent)?;
        }

        let unique_id = input.unique_id.unwrap_or_else(uuid::Uuid::new_v4);
        if tables.models.contains_key(&unique_id) {
            return Err(CoreError::Conflict(format!("model {unique_id} already exists")));
        }

        let now = chrono::Utc::now();
        let model = Model {
            id: tables.next_id(),
            unique_id,
            running_status: RunningStatus::NotRun,
            initial_magnetization: input.initial_magnetization,
            geometry_id: input.geometry_id,
            materials: input.materials,
            max_energy_evaluations: input
                .max_energy_evaluations
                .unwrap_or(DEFAULT_MAX_ENERGY_EVALUATIONS),
            solver_executable: input.solver_executable,
            quants: ModelQuants::default(),
            created: now,
            last_modified: now,
        };
        tables.models.insert(unique_id, model.clone());
        tracing::debug!(unique_id = %unique_id, "Model inserted");
        Ok(model)
    }

    pub fn find<'a>(tables: &'a Tables, unique_id: &UniqueId) -> Result<&'a Model, CoreError> {
        tables.models.get(unique_id).ok_or_else(|| not_found(unique_id))
    }

    fn find_mut<'a>(
        tables: &'a mut Tables,
        unique_id: &UniqueId,
    ) -> Result<&'a mut Model, CoreError> {
        tables
            .models
            .get_mut(unique_id)
            .ok_or_else(|| not_found(unique_id))
    }

    /// Write a new status, failing with `Conflict` if `expected` is given
    /// and differs from the current one.
    pub fn set_status(
        tables: &mut Tables,
        unique_id: &UniqueId,
        new_status: RunningStatus,
        expected: Option<RunningStatus>,
    ) -> Result<RunningStatus, CoreError> {
        let model = Self::find_mut(tables, unique_id)?;
        let previous = model.running_status;
        if let Some(expected) = expected {
            if previous != expected {
                return Err(CoreError::Conflict(format!(
                    "model {unique_id} is {previous}, expected {expected}"
                )));
            }
        }
        model.running_status = new_status;
        model.last_modified = chrono::Utc::now();
        tracing::info!(
            unique_id = %unique_id,
            from = %previous,
            to = %new_status,
            "Model running status changed",
        );
        Ok(new_status)
    }

    pub fn merge_quants(
        tables: &mut Tables,
        unique_id: &UniqueId,
        update: &ModelQuants,
    ) -> Result<ModelQuants, CoreError> {
        let model = Self::find_mut(tables, unique_id)?;
        model.quants.merge(update);
        model.last_modified = chrono::Utc::now();
        tracing::debug!(
            unique_id = %unique_id,
            fields = update.populated_count(),
            "Model quants merged",
        );
        Ok(model.quants.clone())
    }

    /// Collect the model, its geometry, script parameters and parent status.
    pub fn run_context(tables: &Tables, unique_id: &UniqueId) -> Result<ModelRunContext, CoreError> {
        let model = Self::find(tables, unique_id)?;
        let geometry = GeometryRepo::find(tables, model.geometry_id)?;

        let mut materials = Vec::with_capacity(model.materials.len());
        for assignment in &model.materials {
            let material = MaterialRepo::find(tables, assignment.material_id)?;
            materials.push(ScriptMaterial {
                submesh_id: assignment.submesh_id,
                name: material.name.clone(),
                temperature: material.temperature,
            });
        }

        let parent_status = match &model.initial_magnetization {
            InitialMagnetization::ModelRef { unique_id: parent } => {
                Some(Self::find(tables, parent)?.running_status)
            }
            InitialMagnetization::Uniform { .. } | InitialMagnetization::Random => None,
        };

        Ok(ModelRunContext {
            script: ModelScriptParams {
                unique_id: model.unique_id,
                materials,
                initial_magnetization: model.initial_magnetization.clone(),
                max_energy_evaluations: model.max_energy_evaluations,
            },
            model: model.clone(),
            geometry: geometry.clone(),
            parent_status,
        })
    }
}
