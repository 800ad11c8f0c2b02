//! Request handlers.
//!
//! Bodies are taken as raw bytes and decoded here so that malformed
//! payloads map onto [`AppError::MalformedPayload`] and ids that are not
//! UUIDs read as unknown ids.

pub mod health;
pub mod model;
pub mod neb;

use m4db_core::error::CoreError;
use m4db_core::types::UniqueId;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Parse an id from the path or body; anything that is not a UUID is unknown.
pub(crate) fn parse_unique_id(entity: &'static str, raw: &str) -> AppResult<UniqueId> {
    raw.parse()
        .map_err(|_| AppError::Core(CoreError::not_found(entity, raw)))
}

/// Decode a JSON object body.
pub(crate) fn json_object(body: &[u8]) -> AppResult<serde_json::Map<String, Value>> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::MalformedPayload(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(AppError::MalformedPayload(e.to_string())),
    }
}

/// Check that each listed id field, when it is a string, names a UUID.
pub(crate) fn check_id_fields(
    map: &serde_json::Map<String, Value>,
    fields: &[(&'static str, &'static str)],
) -> AppResult<()> {
    for &(key, entity) in fields {
        if let Some(Value::String(raw)) = map.get(key) {
            parse_unique_id(entity, raw)?;
        }
    }
    Ok(())
}

/// Deserialize a decoded body into its typed form.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| AppError::MalformedPayload(e.to_string()))
}
