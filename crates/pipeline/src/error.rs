use std::path::PathBuf;

use m4db_client::CoordinatorError;
use m4db_core::archive::ArchiveError;
use m4db_core::postprocessing::PostProcessError;
use m4db_core::types::UniqueId;

/// Errors that end a job attempt as failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A file the job depends on is absent although it should exist.
    #[error("Missing artifact for {unique_id}: {path}")]
    MissingArtifact { unique_id: UniqueId, path: PathBuf },

    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Post-processing error: {0}")]
    PostProcess(#[from] PostProcessError),

    #[error("Failed to spawn solver '{executable}': {source}")]
    SolverSpawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize field output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
