//! Route definitions for the `/model` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::model;
use crate::state::AppState;

/// Routes mounted at `/model`.
///
/// ```text
/// GET    /{id}/running-status          -> get_running_status
/// GET    /{id}/initial-magnetization   -> get_initial_magnetization
/// GET    /{id}/run-prerequisites       -> get_run_prerequisites
/// POST   /set-running-status           -> set_running_status
/// POST   /set-quants                   -> set_quants
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/running-status", get(model::get_running_status))
        .route(
            "/{id}/initial-magnetization",
            get(model::get_initial_magnetization),
        )
        .route("/{id}/run-prerequisites", get(model::get_run_prerequisites))
        .route("/set-running-status", post(model::set_running_status))
        .route("/set-quants", post(model::set_quants))
}
