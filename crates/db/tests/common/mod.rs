//! Shared fixtures for registry integration tests.

use m4db_core::magnetization::InitialMagnetization;
use m4db_db::models::geometry::CreateGeometry;
use m4db_db::models::material::CreateMaterial;
use m4db_db::models::model::{CreateModel, Model, SubmeshMaterial};
use m4db_db::Registry;

/// IDs created by [`seed`].
pub struct Seeded {
    pub geometry_a: i64,
    pub geometry_b: i64,
    pub magnetite: i64,
    pub iron: i64,
}

/// Two geometries and two materials.
pub async fn seed(registry: &Registry) -> Seeded {
    let geometry_a = registry
        .insert_geometry(CreateGeometry {
            name: "cube-80nm".to_string(),
            unique_id: None,
        })
        .await
        .unwrap()
        .id;
    let geometry_b = registry
        .insert_geometry(CreateGeometry {
            name: "octahedron-100nm".to_string(),
            unique_id: None,
        })
        .await
        .unwrap()
        .id;
    let magnetite = registry
        .insert_material(CreateMaterial {
            name: "magnetite".to_string(),
            temperature: 20.0,
        })
        .await
        .unwrap()
        .id;
    let iron = registry
        .insert_material(CreateMaterial {
            name: "iron".to_string(),
            temperature: 20.0,
        })
        .await
        .unwrap()
        .id;
    Seeded {
        geometry_a,
        geometry_b,
        magnetite,
        iron,
    }
}

pub async fn model(
    registry: &Registry,
    geometry_id: i64,
    material_ids: &[i64],
    initial_magnetization: InitialMagnetization,
) -> Model {
    let materials = material_ids
        .iter()
        .enumerate()
        .map(|(i, &material_id)| SubmeshMaterial {
            submesh_id: i as u32 + 1,
            material_id,
        })
        .collect();
    registry
        .insert_model(CreateModel {
            unique_id: None,
            geometry_id,
            materials,
            initial_magnetization,
            max_energy_evaluations: None,
            solver_executable: None,
        })
        .await
        .unwrap()
}
