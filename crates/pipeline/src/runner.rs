//! The job runner state machine.
//!
//! ```text
//! Pending -> Waiting -> ResolvingDeps -> Running -> PostProcessing
//!         -> Archiving -> Reporting -> Done | Deferred | Failed
//! ```
//!
//! Every attempt works in a private temporary directory under the working
//! root which is removed when the attempt ends, whatever the outcome. The
//! coordinator only learns about results after the archive is safely in the
//! file store: quants first, then `finished`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use m4db_client::{CoordinatorError, RunCoordinator};
use m4db_core::archive::zip_directory;
use m4db_core::directories::{
    DATA_ZIP_FILE_NAME, GEOMETRY_PATRAN_FILE_NAME, MAGNETIZATION_JSON_FILE_NAME,
    MAGNETIZATION_MULT_TECPLOT_FILE_NAME, MAGNETIZATION_TECPLOT_FILE_NAME, MODEL_SCRIPT_FILE_NAME,
    MODEL_STDOUT_FILE_NAME,
};
use m4db_core::postprocessing::field::net_quantities;
use m4db_core::postprocessing::merrill_stdout::{ensure_finished, parse_energy_report};
use m4db_core::postprocessing::tecplot::load_tecplot;
use m4db_core::postprocessing::PostProcessError;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::types::UniqueId;

use crate::config::RunnerConfig;
use crate::error::PipelineError;
use crate::jitter::jitter_delay;
use crate::resolver::{resolve_dependency, Resolution};
use crate::solver::run_solver;

/// Stage of a job attempt, as it appears in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Waiting,
    ResolvingDeps,
    Running,
    PostProcessing,
    Archiving,
    Reporting,
    Done,
    Deferred,
    Failed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::ResolvingDeps => "resolving-deps",
            Self::Running => "running",
            Self::PostProcessing => "post-processing",
            Self::Archiving => "archiving",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Deferred => "deferred",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt ended without running the solver.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferReason {
    /// The parent model is not `finished` yet.
    ParentNotFinished {
        parent: UniqueId,
        status: RunningStatus,
    },
    /// The model is already `running` somewhere else.
    AlreadyRunning,
    /// The status changed between our read and our claim. `current` is the
    /// status read back after the conflict.
    ClaimLost {
        observed: RunningStatus,
        current: RunningStatus,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct FinishedJob {
    /// Quants as merged by the coordinator.
    pub quants: ModelQuants,
    pub archive_path: PathBuf,
    /// Files stored in the archive, in name order.
    pub archived_files: Vec<String>,
    pub solver_duration: Duration,
}

/// How an attempt ended, short of failing.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Finished(FinishedJob),
    /// The solver did not complete; the model was marked `re-run`.
    ReRun,
    /// Nothing was run and nothing was written.
    Deferred(DeferReason),
}

/// Runs single models against a coordinator.
pub struct JobRunner {
    coordinator: Arc<dyn RunCoordinator>,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(coordinator: Arc<dyn RunCoordinator>, config: RunnerConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Run one attempt of the model `unique_id`.
    pub async fn run(&self, unique_id: &UniqueId) -> Result<JobOutcome, PipelineError> {
        enter(unique_id, JobState::Pending);
        let result = self.attempt(unique_id).await;
        match &result {
            Ok(JobOutcome::Finished(_)) => enter(unique_id, JobState::Done),
            Ok(JobOutcome::ReRun) => {
                tracing::warn!(unique_id = %unique_id, "Solver output incomplete, model marked re-run");
                enter(unique_id, JobState::Done);
            }
            Ok(JobOutcome::Deferred(reason)) => {
                tracing::info!(unique_id = %unique_id, reason = ?reason, state = %JobState::Deferred, "Job deferred");
            }
            Err(e) => {
                tracing::error!(unique_id = %unique_id, error = %e, state = %JobState::Failed, "Job failed");
            }
        }
        result
    }

    async fn attempt(&self, unique_id: &UniqueId) -> Result<JobOutcome, PipelineError> {
        let delay = jitter_delay(
            unique_id,
            self.config.jitter_min_secs,
            self.config.jitter_max_secs,
        );
        tracing::info!(
            unique_id = %unique_id,
            state = %JobState::Waiting,
            delay_secs = delay.as_secs(),
            "Job state",
        );
        tokio::time::sleep(delay).await;

        // Dropping the TempDir removes the working directory on every path out.
        let workdir = tempfile::Builder::new()
            .prefix("m4db-job-")
            .tempdir_in(&self.config.working_root)
            .map_err(PipelineError::io(&self.config.working_root))?;
        let dir = workdir.path();

        enter(unique_id, JobState::ResolvingDeps);
        let initial = self
            .coordinator
            .get_initial_magnetization(unique_id)
            .await?;
        let parent_copy =
            match resolve_dependency(&*self.coordinator, &self.config.layout, &initial, dir).await? {
                Resolution::Ready { parent_copy } => parent_copy,
                Resolution::NotReady { parent, status } => {
                    return Ok(JobOutcome::Deferred(DeferReason::ParentNotFinished {
                        parent,
                        status,
                    }))
                }
            };

        // Local staging precedes the claim: failures here write nothing.
        let prerequisites = self.coordinator.get_run_prerequisites(unique_id).await?;
        let script_path = dir.join(MODEL_SCRIPT_FILE_NAME);
        tokio::fs::write(&script_path, &prerequisites.merrill_script)
            .await
            .map_err(PipelineError::io(&script_path))?;
        stage_mesh(unique_id, &prerequisites.geometry_file_abs_path, dir).await?;

        enter(unique_id, JobState::Running);
        let observed = match self.claim(unique_id).await? {
            Ok(observed) => observed,
            Err(reason) => return Ok(JobOutcome::Deferred(reason)),
        };

        let solver = match run_solver(
            &prerequisites.merrill_executable,
            MODEL_SCRIPT_FILE_NAME,
            dir,
        )
        .await
        {
            Ok(solver) => solver,
            Err(e) => {
                self.release(unique_id, observed).await;
                return Err(e);
            }
        };

        if let Some(copy) = parent_copy {
            tokio::fs::remove_dir_all(&copy)
                .await
                .map_err(PipelineError::io(&copy))?;
        }
        let multi = dir.join(MAGNETIZATION_MULT_TECPLOT_FILE_NAME);
        if tokio::fs::try_exists(&multi)
            .await
            .map_err(PipelineError::io(&multi))?
        {
            let single = dir.join(MAGNETIZATION_TECPLOT_FILE_NAME);
            tokio::fs::rename(&multi, &single)
                .await
                .map_err(PipelineError::io(&single))?;
        }

        enter(unique_id, JobState::PostProcessing);
        let stdout_path = dir.join(MODEL_STDOUT_FILE_NAME);
        let stdout = tokio::fs::read(&stdout_path)
            .await
            .map_err(PipelineError::io(&stdout_path))?;
        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        match ensure_finished(&stdout, &self.config.completion_sentinel) {
            Ok(()) => {}
            Err(PostProcessError::SolverIncomplete { sentinel }) => {
                tracing::info!(unique_id = %unique_id, %sentinel, "Completion sentinel not found");
                self.coordinator
                    .set_running_status(unique_id, RunningStatus::ReRun)
                    .await?;
                return Ok(JobOutcome::ReRun);
            }
            Err(e) => return Err(e.into()),
        }
        let job_dir = dir.to_path_buf();
        let quants = tokio::task::spawn_blocking(move || derive_quants(&job_dir, &stdout)).await??;

        enter(unique_id, JobState::Archiving);
        let (archive_path, archived_files) = self.archive(unique_id, dir).await?;

        enter(unique_id, JobState::Reporting);
        let merged = self.coordinator.set_quants(unique_id, &quants).await?;
        self.coordinator
            .set_running_status(unique_id, RunningStatus::Finished)
            .await?;

        Ok(JobOutcome::Finished(FinishedJob {
            quants: merged,
            archive_path,
            archived_files,
            solver_duration: solver.duration,
        }))
    }

    /// Claim the model by moving it from its observed status to `running`.
    ///
    /// The conditional write only catches a change landing between our read
    /// and our write. A model already `running` is left to its holder; any
    /// other status, `finished` included, may be claimed and run again.
    async fn claim(
        &self,
        unique_id: &UniqueId,
    ) -> Result<Result<RunningStatus, DeferReason>, PipelineError> {
        let observed = self.coordinator.get_running_status(unique_id).await?;
        if observed == RunningStatus::Running {
            return Ok(Err(DeferReason::AlreadyRunning));
        }
        match self
            .coordinator
            .set_running_status_if(unique_id, observed, RunningStatus::Running)
            .await
        {
            Ok(_) => Ok(Ok(observed)),
            Err(CoordinatorError::Conflict(message)) => {
                // A retried claim whose first response was lost also lands
                // here; the status read back tells the operator which.
                let current = self.coordinator.get_running_status(unique_id).await?;
                tracing::warn!(
                    unique_id = %unique_id,
                    %observed,
                    %current,
                    %message,
                    "Claim rejected",
                );
                Ok(Err(DeferReason::ClaimLost { observed, current }))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Put back the status seen before a claim whose solver never started.
    async fn release(&self, unique_id: &UniqueId, observed: RunningStatus) {
        if let Err(e) = self
            .coordinator
            .set_running_status(unique_id, observed)
            .await
        {
            tracing::error!(
                unique_id = %unique_id,
                %observed,
                error = %e,
                "Failed to release claim, model left running",
            );
        }
    }

    /// Zip the working directory and publish the archive at its canonical
    /// path. Readers see either no archive or a complete one.
    async fn archive(
        &self,
        unique_id: &UniqueId,
        dir: &Path,
    ) -> Result<(PathBuf, Vec<String>), PipelineError> {
        let local = dir.join(DATA_ZIP_FILE_NAME);
        let (source, target) = (dir.to_path_buf(), local.clone());
        let files = tokio::task::spawn_blocking(move || zip_directory(&source, &target)).await??;

        let dest_dir = self.config.layout.model_directory(unique_id);
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(PipelineError::io(&dest_dir))?;
        let dest = self.config.layout.model_archive_path(unique_id);
        let partial = dest.with_extension("zip.partial");
        tokio::fs::copy(&local, &partial)
            .await
            .map_err(PipelineError::io(&partial))?;
        tokio::fs::rename(&partial, &dest)
            .await
            .map_err(PipelineError::io(&dest))?;

        tracing::info!(
            unique_id = %unique_id,
            archive = %dest.display(),
            files = files.len(),
            "Archive stored",
        );
        Ok((dest, files))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn enter(unique_id: &UniqueId, state: JobState) {
    tracing::info!(unique_id = %unique_id, state = %state, "Job state");
}

/// Copy the mesh into the working directory under its canonical name.
async fn stage_mesh(unique_id: &UniqueId, mesh: &Path, dir: &Path) -> Result<(), PipelineError> {
    let exists = tokio::fs::try_exists(mesh)
        .await
        .map_err(PipelineError::io(mesh))?;
    if !exists {
        return Err(PipelineError::MissingArtifact {
            unique_id: *unique_id,
            path: mesh.to_path_buf(),
        });
    }
    let target = dir.join(GEOMETRY_PATRAN_FILE_NAME);
    tokio::fs::copy(mesh, &target)
        .await
        .map_err(PipelineError::io(&target))?;
    Ok(())
}

/// Energies from standard output plus field integrals from the Tecplot
/// output; also writes the JSON rendition of the field.
fn derive_quants(dir: &Path, stdout: &str) -> Result<ModelQuants, PipelineError> {
    let mut quants = ModelQuants::default();
    parse_energy_report(stdout)?.apply_to(&mut quants);

    let zone = load_tecplot(&dir.join(MAGNETIZATION_TECPLOT_FILE_NAME))?;
    net_quantities(&zone)?.apply_to(&mut quants);

    let json_path = dir.join(MAGNETIZATION_JSON_FILE_NAME);
    let json = serde_json::to_vec(&zone)?;
    std::fs::write(&json_path, json).map_err(PipelineError::io(&json_path))?;

    tracing::debug!(
        nodes = zone.nodes,
        elements = zone.elements,
        populated = quants.populated_count(),
        "Derived quantities computed",
    );
    Ok(quants)
}
