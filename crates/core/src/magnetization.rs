//! Initial magnetization variants.
//!
//! A model starts either from a uniform field, from randomized moments, or
//! from the final state of another model. Only the last variant creates a
//! dependency between jobs.

use serde::{Deserialize, Serialize};

use crate::types::UniqueId;

/// Wire tag for [`InitialMagnetization::Uniform`].
pub const TAG_UNIFORM: &str = "uniform";

/// Wire tag for [`InitialMagnetization::Random`].
pub const TAG_RANDOM: &str = "random";

/// Wire tag for [`InitialMagnetization::ModelRef`].
pub const TAG_MODEL: &str = "model";

/// How the solver seeds the magnetization of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InitialMagnetization {
    Uniform {
        #[serde(rename = "dir-x")]
        dir_x: f64,
        #[serde(rename = "dir-y")]
        dir_y: f64,
        #[serde(rename = "dir-z")]
        dir_z: f64,
        /// Field magnitude in micro Tesla.
        magnitude: f64,
    },
    Random,
    /// Start from the final state of the parent model.
    #[serde(rename = "model")]
    ModelRef {
        #[serde(rename = "unique-id")]
        unique_id: UniqueId,
    },
}

impl InitialMagnetization {
    /// Wire tag of the variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Uniform { .. } => TAG_UNIFORM,
            Self::Random => TAG_RANDOM,
            Self::ModelRef { .. } => TAG_MODEL,
        }
    }

    /// Unique id of the parent model, if this variant depends on one.
    pub fn parent(&self) -> Option<UniqueId> {
        match self {
            Self::ModelRef { unique_id } => Some(*unique_id),
            Self::Uniform { .. } | Self::Random => None,
        }
    }
}
