//! Domain errors shared by the registry and the coordinator service.

use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `id` is rendered as text so integer ids and unique ids share a variant.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A conditional write found a different current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A cross-entity rule (e.g. NEB endpoint consistency) does not hold.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
