//! Route definitions for the `/neb` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::neb;
use crate::state::AppState;

/// Routes mounted at `/neb`.
///
/// ```text
/// POST   /         -> create_neb
/// GET    /{id}     -> get_neb
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(neb::create_neb))
        .route("/{id}", get(neb::get_neb))
}
