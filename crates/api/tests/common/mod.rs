use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use m4db_api::config::ServerConfig;
use m4db_api::router::build_app_router;
use m4db_api::state::AppState;
use m4db_core::magnetization::InitialMagnetization;
use m4db_db::models::geometry::CreateGeometry;
use m4db_db::models::material::CreateMaterial;
use m4db_db::models::model::{CreateModel, Model, SubmeshMaterial};
use m4db_db::Registry;
use tower::ServiceExt;

/// Build a test `ServerConfig` rooted at `file_root`.
pub fn test_config(file_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        file_root: file_root.to_path_buf(),
        registry_path: None,
        default_solver_executable: "merrill".to_string(),
        request_timeout_secs: 30,
    }
}

/// Build the full application router over an in-memory registry.
pub fn build_test_app(file_root: &Path) -> (Router, Arc<Registry>) {
    let registry = Arc::new(Registry::in_memory());
    let state = AppState::new(Arc::clone(&registry), test_config(file_root));
    (build_app_router(state), registry)
}

/// Seeded ids shared by API tests.
pub struct Fixture {
    pub geometry_id: i64,
    pub other_geometry_id: i64,
    pub geometry_uid: uuid::Uuid,
    pub magnetite: i64,
    pub iron: i64,
}

pub async fn seed(registry: &Registry) -> Fixture {
    let geometry = registry
        .insert_geometry(CreateGeometry {
            name: "cube-80nm".to_string(),
            unique_id: None,
        })
        .await
        .unwrap();
    let other = registry
        .insert_geometry(CreateGeometry {
            name: "sphere-60nm".to_string(),
            unique_id: None,
        })
        .await
        .unwrap();
    let magnetite = registry
        .insert_material(CreateMaterial {
            name: "magnetite".to_string(),
            temperature: 20.0,
        })
        .await
        .unwrap();
    let iron = registry
        .insert_material(CreateMaterial {
            name: "iron".to_string(),
            temperature: 20.0,
        })
        .await
        .unwrap();
    Fixture {
        geometry_id: geometry.id,
        other_geometry_id: other.id,
        geometry_uid: geometry.unique_id,
        magnetite: magnetite.id,
        iron: iron.id,
    }
}

pub async fn add_model(
    registry: &Registry,
    geometry_id: i64,
    material_id: i64,
    initial_magnetization: InitialMagnetization,
) -> Model {
    registry
        .insert_model(CreateModel {
            unique_id: None,
            geometry_id,
            materials: vec![SubmeshMaterial {
                submesh_id: 1,
                material_id,
            }],
            initial_magnetization,
            max_energy_evaluations: None,
            solver_executable: None,
        })
        .await
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
