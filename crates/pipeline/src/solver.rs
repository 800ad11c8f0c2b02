//! Solver process management.
//!
//! The solver is spawned directly from an argument vector (no shell) inside
//! the job's working directory, with standard output and error redirected
//! to the canonical files there. Nothing is piped through this process, so
//! arbitrarily verbose solver output never sits in memory.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use m4db_core::directories::{MODEL_STDERR_FILE_NAME, MODEL_STDOUT_FILE_NAME};
use tokio::process::Command;

use crate::error::PipelineError;

/// What the solver process left behind, apart from its files.
#[derive(Debug, Clone)]
pub struct SolverRun {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Wall-clock time from spawn to exit.
    pub duration: Duration,
}

/// Run `<executable> <script_name>` in `workdir` and wait for it to exit.
///
/// The exit code is recorded but not interpreted; completion is judged from
/// the standard output alone.
pub async fn run_solver(
    executable: &str,
    script_name: &str,
    workdir: &Path,
) -> Result<SolverRun, PipelineError> {
    let stdout_path = workdir.join(MODEL_STDOUT_FILE_NAME);
    let stderr_path = workdir.join(MODEL_STDERR_FILE_NAME);
    let stdout = std::fs::File::create(&stdout_path).map_err(PipelineError::io(&stdout_path))?;
    let stderr = std::fs::File::create(&stderr_path).map_err(PipelineError::io(&stderr_path))?;

    let mut cmd = Command::new(executable);
    cmd.arg(script_name)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|source| PipelineError::SolverSpawn {
        executable: executable.to_string(),
        source,
    })?;
    tracing::info!(
        executable,
        script = script_name,
        pid = child.id(),
        workdir = %workdir.display(),
        "Solver started",
    );

    let status = child.wait().await.map_err(PipelineError::io(workdir))?;
    let run = SolverRun {
        exit_code: status.code(),
        duration: start.elapsed(),
    };
    tracing::info!(
        exit_code = ?run.exit_code,
        duration_ms = run.duration.as_millis() as u64,
        "Solver exited",
    );
    Ok(run)
}
