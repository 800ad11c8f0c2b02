//! Repository for NEB paths.

use m4db_core::error::CoreError;
use m4db_core::neb::{
    validate_root_neb, EndpointMaterial, NebEndpoint, DEFAULT_NEB_MAX_ENERGY_EVALUATIONS,
    DEFAULT_NEB_MAX_PATH_EVALUATIONS,
};
use m4db_core::running_status::RunningStatus;
use m4db_core::types::UniqueId;

use super::{MaterialRepo, ModelRepo};
use crate::models::neb::{CreateNeb, Neb};
use crate::registry::Tables;

pub struct NebRepo;

impl NebRepo {
    /// Insert a NEB. Root paths must pass the endpoint consistency rules;
    /// refinements only need an existing parent.
    pub fn insert(tables: &mut Tables, input: CreateNeb) -> Result<Neb, CoreError> {
        let start = Self::endpoint(tables, &input.start_model_unique_id)?;
        let end = Self::endpoint(tables, &input.end_model_unique_id)?;

        match &input.parent_neb_unique_id {
            Some(parent) => {
                Self::find(tables, parent)?;
            }
            None => validate_root_neb(&start, &end)?,
        }

        let now = chrono::Utc::now();
        let neb = Neb {
            id: tables.next_id(),
            unique_id: uuid::Uuid::new_v4(),
            start_model_unique_id: input.start_model_unique_id,
            end_model_unique_id: input.end_model_unique_id,
            parent_neb_unique_id: input.parent_neb_unique_id,
            running_status: RunningStatus::NotRun,
            spring_constant: input.spring_constant,
            curvature_weight: input.curvature_weight,
            no_of_points: input.no_of_points,
            max_energy_evaluations: input
                .max_energy_evaluations
                .unwrap_or(DEFAULT_NEB_MAX_ENERGY_EVALUATIONS),
            max_path_evaluations: input
                .max_path_evaluations
                .unwrap_or(DEFAULT_NEB_MAX_PATH_EVALUATIONS),
            energy_barrier: None,
            created: now,
            last_modified: now,
        };
        tables.nebs.insert(neb.unique_id, neb.clone());
        tracing::info!(
            unique_id = %neb.unique_id,
            start = %neb.start_model_unique_id,
            end = %neb.end_model_unique_id,
            "NEB inserted",
        );
        Ok(neb)
    }

    pub fn find<'a>(tables: &'a Tables, unique_id: &UniqueId) -> Result<&'a Neb, CoreError> {
        tables.nebs.get(unique_id).ok_or_else(|| CoreError::not_found("neb", unique_id))
    }

    fn endpoint(tables: &Tables, unique_id: &UniqueId) -> Result<NebEndpoint, CoreError> {
        let model = ModelRepo::find(tables, unique_id)?;
        let materials = model
            .materials
            .iter()
            .map(|assignment| {
                MaterialRepo::find(tables, assignment.material_id).map(|m| EndpointMaterial {
                    material_id: m.id,
                    name: m.name.clone(),
                    temperature: m.temperature,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(NebEndpoint {
            unique_id: model.unique_id,
            geometry_id: model.geometry_id,
            materials,
        })
    }
}
