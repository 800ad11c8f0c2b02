//! Handlers for the `/neb` resource.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use m4db_core::wire::Envelope;
use m4db_db::models::neb::{CreateNeb, Neb};

use super::{check_id_fields, decode, json_object, parse_unique_id};
use crate::error::AppResult;
use crate::response::ok;
use crate::state::AppState;

/// POST /neb
///
/// Root paths are validated against their endpoints before insertion; a
/// violation is a 422 and nothing is stored.
pub async fn create_neb(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Envelope<Neb>>> {
    let map = json_object(&body)?;
    check_id_fields(
        &map,
        &[
            ("start-model-unique-id", "model"),
            ("end-model-unique-id", "model"),
            ("parent-neb-unique-id", "neb"),
        ],
    )?;
    let input: CreateNeb = decode(map.into())?;

    let neb = state.registry.insert_neb(input).await?;
    Ok(ok(neb))
}

/// GET /neb/{id}
pub async fn get_neb(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Neb>>> {
    let unique_id = parse_unique_id("neb", &id)?;
    let neb = state.registry.find_neb(&unique_id).await?;
    Ok(ok(neb))
}
