//! Repository for geometries.

use m4db_core::error::CoreError;
use m4db_core::types::DbId;

use crate::models::geometry::{CreateGeometry, Geometry};
use crate::registry::Tables;

pub struct GeometryRepo;

impl GeometryRepo {
    pub fn insert(tables: &mut Tables, input: CreateGeometry) -> Result<Geometry, CoreError> {
        let unique_id = input.unique_id.unwrap_or_else(uuid::Uuid::new_v4);
        if tables.geometries.values().any(|g| g.unique_id == unique_id) {
            return Err(CoreError::Conflict(format!(
                "geometry {unique_id} already exists"
            )));
        }
        let geometry = Geometry {
            id: tables.next_id(),
            unique_id,
            name: input.name,
            created: chrono::Utc::now(),
        };
        tables.geometries.insert(geometry.id, geometry.clone());
        Ok(geometry)
    }

    pub fn find(tables: &Tables, id: DbId) -> Result<&Geometry, CoreError> {
        tables.geometries.get(&id).ok_or_else(|| CoreError::not_found("geometry", id))
    }
}
