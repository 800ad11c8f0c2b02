pub mod health;
pub mod model;
pub mod neb;

use axum::Router;

use crate::state::AppState;

/// Build the coordinator route tree.
///
/// Route hierarchy:
///
/// ```text
/// /is-alive                                  liveness probe
///
/// /model/{id}/running-status                 current status (GET)
/// /model/{id}/initial-magnetization          initial magnetization (GET)
/// /model/{id}/run-prerequisites              script, paths, parent (GET)
/// /model/set-running-status                  status write (POST)
/// /model/set-quants                          quants merge (POST)
///
/// /neb                                       create (POST)
/// /neb/{id}                                  get
/// ```
pub fn coordinator_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/model", model::router())
        .nest("/neb", neb::router())
}
