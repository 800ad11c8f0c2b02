//! Parent dependency resolution.
//!
//! Only [`InitialMagnetization::ModelRef`] creates a dependency. Such a job
//! may run once its parent is `finished` and the parent's archive is in the
//! file store; the archive is then unpacked into the job's working directory
//! under the parent's hyphenated unique id, which is where the rendered
//! script reads the parent field from.

use std::path::{Path, PathBuf};

use m4db_client::RunCoordinator;
use m4db_core::archive::unpack_archive;
use m4db_core::directories::FileLayout;
use m4db_core::magnetization::InitialMagnetization;
use m4db_core::running_status::RunningStatus;
use m4db_core::types::UniqueId;

use crate::error::PipelineError;

/// Whether a job may start.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The job may run. `parent_copy` is the unpacked parent directory, if any.
    Ready { parent_copy: Option<PathBuf> },
    /// The parent has not finished yet; nothing was touched.
    NotReady {
        parent: UniqueId,
        status: RunningStatus,
    },
}

/// Decide whether a job with `initial_magnetization` may run and, for a
/// child job, stage its parent's files inside `workdir`.
///
/// A finished parent whose archive is absent is a [`PipelineError::MissingArtifact`].
pub async fn resolve_dependency(
    coordinator: &dyn RunCoordinator,
    layout: &FileLayout,
    initial_magnetization: &InitialMagnetization,
    workdir: &Path,
) -> Result<Resolution, PipelineError> {
    let parent = match initial_magnetization {
        InitialMagnetization::Uniform { .. } | InitialMagnetization::Random => {
            return Ok(Resolution::Ready { parent_copy: None })
        }
        InitialMagnetization::ModelRef { unique_id } => *unique_id,
    };

    let status = coordinator.get_running_status(&parent).await?;
    if !status.is_finished() {
        tracing::info!(parent = %parent, status = %status, "Parent model not finished");
        return Ok(Resolution::NotReady { parent, status });
    }

    let archive = layout.model_archive_path(&parent);
    let exists = tokio::fs::try_exists(&archive)
        .await
        .map_err(PipelineError::io(&archive))?;
    if !exists {
        return Err(PipelineError::MissingArtifact {
            unique_id: parent,
            path: archive,
        });
    }

    let dest = workdir.join(parent.hyphenated().to_string());
    tracing::debug!(
        parent = %parent,
        archive = %archive.display(),
        dest = %dest.display(),
        "Unpacking parent archive",
    );
    let target = dest.clone();
    tokio::task::spawn_blocking(move || unpack_archive(&archive, &target)).await??;

    Ok(Resolution::Ready {
        parent_copy: Some(dest),
    })
}
