use axum::Json;
use m4db_core::wire::Envelope;

use crate::response::ok;

/// GET /is-alive
pub async fn is_alive() -> Json<Envelope<bool>> {
    ok(true)
}
