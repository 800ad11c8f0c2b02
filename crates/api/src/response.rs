//! Shared response envelope for API handlers.
//!
//! Every successful response is `{ "return": ... }`. Use [`ok`] instead of
//! ad-hoc `serde_json::json!({ "return": ... })`.

use axum::Json;
use m4db_core::wire::Envelope;
use serde::Serialize;

/// Wrap a payload in the `{"return": T}` envelope.
pub fn ok<T: Serialize>(value: T) -> Json<Envelope<T>> {
    Json(Envelope::new(value))
}
