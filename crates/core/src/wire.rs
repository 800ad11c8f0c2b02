//! JSON bodies exchanged between the coordinator and its runners.
//!
//! Every successful response wraps its payload as `{"return": <payload>}`;
//! field names are kebab-case.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::running_status::RunningStatus;
use crate::types::UniqueId;

/// Key naming the model in request bodies.
pub const UNIQUE_ID_KEY: &str = "unique-id";

/// Successful response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "return")]
    pub value: T,
}

impl<T> Envelope<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

/// Everything a runner needs to execute one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunPrerequisites {
    pub merrill_script: String,
    pub geometry_file_abs_path: PathBuf,
    pub model_dir_abs_path: PathBuf,
    pub merrill_executable: String,
    pub initial_magnetization_type: String,
    /// Archive of the parent model, for `model` initial magnetizations.
    pub initial_magnetization_data_zip: Option<PathBuf>,
    pub initial_magnetization_finished: Option<bool>,
    #[serde(default)]
    pub initial_magnetization_unique_id: Option<UniqueId>,
}

/// Body of `POST /model/set-running-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SetRunningStatusRequest {
    pub unique_id: UniqueId,
    pub new_running_status: RunningStatus,
    /// When present the write only happens if the current status matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_running_status: Option<RunningStatus>,
}
