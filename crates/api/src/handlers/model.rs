//! Handlers for the `/model` resource.
//!
//! These are the endpoints job runners talk to: status reads and writes,
//! result merging, and the prerequisites of a run.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use m4db_core::magnetization::InitialMagnetization;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::script::render_model_script;
use m4db_core::wire::{Envelope, RunPrerequisites, SetRunningStatusRequest, UNIQUE_ID_KEY};

use super::{check_id_fields, decode, json_object, parse_unique_id};
use crate::error::{AppError, AppResult};
use crate::response::ok;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /model/{id}/running-status
pub async fn get_running_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<RunningStatus>>> {
    let unique_id = parse_unique_id("model", &id)?;
    let status = state.registry.model_status(&unique_id).await?;
    Ok(ok(status))
}

/// GET /model/{id}/initial-magnetization
pub async fn get_initial_magnetization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<InitialMagnetization>>> {
    let unique_id = parse_unique_id("model", &id)?;
    let model = state.registry.find_model(&unique_id).await?;
    Ok(ok(model.initial_magnetization))
}

/// GET /model/{id}/run-prerequisites
///
/// Renders the solver script and resolves every path a runner needs. For
/// models that start from a parent, also reports the parent's archive path
/// and whether the parent has finished.
pub async fn get_run_prerequisites(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<RunPrerequisites>>> {
    let unique_id = parse_unique_id("model", &id)?;
    let ctx = state.registry.model_run_context(&unique_id).await?;

    let parent = ctx.model.initial_magnetization.parent();
    let prerequisites = RunPrerequisites {
        merrill_script: render_model_script(&ctx.script),
        geometry_file_abs_path: state.layout.geometry_file_path(&ctx.geometry.unique_id),
        model_dir_abs_path: state.layout.model_directory(&unique_id),
        merrill_executable: ctx
            .model
            .solver_executable
            .clone()
            .unwrap_or_else(|| state.config.default_solver_executable.clone()),
        initial_magnetization_type: ctx.model.initial_magnetization.tag().to_string(),
        initial_magnetization_data_zip: parent.map(|p| state.layout.model_archive_path(&p)),
        initial_magnetization_finished: ctx.parent_status.map(|s| s.is_finished()),
        initial_magnetization_unique_id: parent,
    };

    tracing::debug!(
        unique_id = %unique_id,
        initial_magnetization = %prerequisites.initial_magnetization_type,
        "Run prerequisites served",
    );
    Ok(ok(prerequisites))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /model/set-running-status
///
/// Last-write-wins unless `expected-running-status` is given, in which case
/// a mismatch is a 409.
pub async fn set_running_status(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Envelope<RunningStatus>>> {
    let map = json_object(&body)?;
    check_id_fields(&map, &[(UNIQUE_ID_KEY, "model")])?;
    let request: SetRunningStatusRequest = decode(map.into())?;

    let status = state
        .registry
        .set_model_status(
            &request.unique_id,
            request.new_running_status,
            request.expected_running_status,
        )
        .await?;
    Ok(ok(status))
}

/// POST /model/set-quants
///
/// Merges any subset of the quant fields; fields not supplied keep their
/// stored values. Returns the merged quants.
pub async fn set_quants(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Envelope<ModelQuants>>> {
    let mut map = json_object(&body)?;
    let unique_id = match map.remove(UNIQUE_ID_KEY) {
        Some(serde_json::Value::String(raw)) => parse_unique_id("model", &raw)?,
        _ => {
            return Err(AppError::MalformedPayload(format!(
                "'{UNIQUE_ID_KEY}' must be a string"
            )))
        }
    };
    let update: ModelQuants = decode(map.into())?;

    let merged = state.registry.merge_model_quants(&unique_id, &update).await?;
    Ok(ok(merged))
}
