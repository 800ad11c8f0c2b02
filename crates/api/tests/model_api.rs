//! Integration tests for the `/model` endpoints.

mod common;

use axum::http::StatusCode;
use m4db_core::directories::FileLayout;
use m4db_core::magnetization::InitialMagnetization;
use m4db_core::running_status::RunningStatus;
use serde_json::json;

use common::{add_model, body_json, get, post_json, post_raw, seed};

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn running_status_of_new_model_is_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;

    let response = get(app, &format!("/model/{}/running-status", model.unique_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"return": "not-run"}));
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _registry) = common::build_test_app(dir.path());

    let response = get(
        app.clone(),
        &format!("/model/{}/running-status", uuid::Uuid::new_v4()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = get(app, "/model/not-a-uuid/run-prerequisites").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn initial_magnetization_uses_tagged_wire_form() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(
        &registry,
        ids.geometry_id,
        ids.magnetite,
        InitialMagnetization::Uniform {
            dir_x: 1.0,
            dir_y: 0.0,
            dir_z: 0.0,
            magnitude: 30.0,
        },
    )
    .await;

    let response = get(app, &format!("/model/{}/initial-magnetization", model.unique_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"return": {"type": "uniform", "dir-x": 1.0, "dir-y": 0.0, "dir-z": 0.0, "magnitude": 30.0}})
    );
}

#[tokio::test]
async fn prerequisites_for_random_model_have_no_parent() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;
    let layout = FileLayout::new(dir.path());

    let response = get(app, &format!("/model/{}/run-prerequisites", model.unique_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let prereqs = &json["return"];

    assert!(prereqs["merrill-script"]
        .as_str()
        .unwrap()
        .contains("Randomize All Moments"));
    assert_eq!(prereqs["merrill-executable"], "merrill");
    assert_eq!(prereqs["initial-magnetization-type"], "random");
    assert_eq!(
        prereqs["geometry-file-abs-path"],
        layout
            .geometry_file_path(&ids.geometry_uid)
            .to_string_lossy()
            .as_ref()
    );
    assert_eq!(
        prereqs["model-dir-abs-path"],
        layout
            .model_directory(&model.unique_id)
            .to_string_lossy()
            .as_ref()
    );
    assert!(prereqs["initial-magnetization-data-zip"].is_null());
    assert!(prereqs["initial-magnetization-finished"].is_null());
}

#[tokio::test]
async fn prerequisites_for_child_report_parent_state() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let parent = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;
    let child = add_model(
        &registry,
        ids.geometry_id,
        ids.magnetite,
        InitialMagnetization::ModelRef {
            unique_id: parent.unique_id,
        },
    )
    .await;
    let uri = format!("/model/{}/run-prerequisites", child.unique_id);

    let json = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(json["return"]["initial-magnetization-type"], "model");
    assert_eq!(json["return"]["initial-magnetization-finished"], false);
    assert_eq!(
        json["return"]["initial-magnetization-unique-id"],
        parent.unique_id.to_string()
    );
    let archive = FileLayout::new(dir.path()).model_archive_path(&parent.unique_id);
    assert_eq!(
        json["return"]["initial-magnetization-data-zip"],
        archive.to_string_lossy().as_ref()
    );

    registry
        .set_model_status(&parent.unique_id, RunningStatus::Finished, None)
        .await
        .unwrap();
    let json = body_json(get(app, &uri).await).await;
    assert_eq!(json["return"]["initial-magnetization-finished"], true);
}

// ---------------------------------------------------------------------------
// Status writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_running_status_is_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;

    let response = post_json(
        app,
        "/model/set-running-status",
        json!({"unique-id": model.unique_id, "new-running-status": "finished"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"return": "finished"}));
    assert_eq!(
        registry.model_status(&model.unique_id).await.unwrap(),
        RunningStatus::Finished
    );
}

#[tokio::test]
async fn conditional_status_write_conflicts_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;

    let response = post_json(
        app,
        "/model/set-running-status",
        json!({
            "unique-id": model.unique_id,
            "new-running-status": "running",
            "expected-running-status": "re-run",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
    assert_eq!(
        registry.model_status(&model.unique_id).await.unwrap(),
        RunningStatus::NotRun
    );
}

#[tokio::test]
async fn malformed_status_payloads_are_500_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;

    let response = post_raw(app.clone(), "/model/set-running-status", "{not json").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        app,
        "/model/set-running-status",
        json!({"unique-id": model.unique_id, "new-running-status": "exploded"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn status_write_for_unknown_model_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _registry) = common::build_test_app(dir.path());

    let response = post_json(
        app.clone(),
        "/model/set-running-status",
        json!({"unique-id": uuid::Uuid::new_v4(), "new-running-status": "running"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        app,
        "/model/set-running-status",
        json!({"unique-id": "model-7", "new-running-status": "running"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Quants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_quants_merges_and_returns_merged_set() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;

    let response = post_json(
        app.clone(),
        "/model/set-quants",
        json!({"unique-id": model.unique_id, "e-tot": 1.5, "mx-tot": 0.25}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app,
        "/model/set-quants",
        json!({"unique-id": model.unique_id, "e-tot": 2.0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"return": {"e-tot": 2.0, "mx-tot": 0.25}})
    );
}

#[tokio::test]
async fn set_quants_rejects_unknown_and_non_numeric_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (app, registry) = common::build_test_app(dir.path());
    let ids = seed(&registry).await;
    let model = add_model(&registry, ids.geometry_id, ids.magnetite, InitialMagnetization::Random).await;

    for body in [
        json!({"unique-id": model.unique_id, "e-bogus": 1.0}),
        json!({"unique-id": model.unique_id, "e-tot": "lots"}),
        json!({"e-tot": 1.0}),
    ] {
        let response = post_json(app.clone(), "/model/set-quants", body).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let stored = registry.find_model(&model.unique_id).await.unwrap();
    assert!(stored.quants.is_empty());
}
