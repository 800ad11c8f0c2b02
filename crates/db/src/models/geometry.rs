//! Geometry (mesh) entities.

use m4db_core::types::{DbId, Timestamp, UniqueId};
use serde::{Deserialize, Serialize};

/// A mesh; its Patran file lives in the geometry shard of `unique_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub id: DbId,
    pub unique_id: UniqueId,
    pub name: String,
    pub created: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGeometry {
    pub name: String,
    /// Assigned when absent.
    pub unique_id: Option<UniqueId>,
}
