//! Repository for materials.

use m4db_core::error::CoreError;
use m4db_core::types::DbId;

use crate::models::material::{CreateMaterial, Material};
use crate::registry::Tables;

pub struct MaterialRepo;

impl MaterialRepo {
    pub fn insert(tables: &mut Tables, input: CreateMaterial) -> Result<Material, CoreError> {
        let material = Material {
            id: tables.next_id(),
            name: input.name,
            temperature: input.temperature,
        };
        tables.materials.insert(material.id, material.clone());
        Ok(material)
    }

    pub fn find(tables: &Tables, id: DbId) -> Result<&Material, CoreError> {
        tables.materials.get(&id).ok_or_else(|| CoreError::not_found("material", id))
    }
}
