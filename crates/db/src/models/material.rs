//! Material entities.

use m4db_core::types::DbId;
use serde::{Deserialize, Serialize};

/// A magnetic material at a temperature (degrees Celsius).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: DbId,
    pub name: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaterial {
    pub name: String,
    pub temperature: f64,
}
