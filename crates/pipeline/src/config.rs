use std::path::PathBuf;

use m4db_core::directories::FileLayout;
use m4db_core::postprocessing::merrill_stdout::DEFAULT_COMPLETION_SENTINEL;

/// Default lower bound of the start-up jitter, in seconds.
pub const DEFAULT_JITTER_MIN_SECS: u64 = 1;

/// Default upper bound of the start-up jitter, in seconds.
pub const DEFAULT_JITTER_MAX_SECS: u64 = 20;

/// Settings for a single job runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Parent directory of each job's private working directory.
    pub working_root: PathBuf,
    /// Layout of the shared file store archives are read from and written to.
    pub layout: FileLayout,
    /// Line the solver prints when the script ran to the end.
    pub completion_sentinel: String,
    pub jitter_min_secs: u64,
    pub jitter_max_secs: u64,
}

impl RunnerConfig {
    /// Defaults for everything but the file store root.
    pub fn new(file_root: impl Into<PathBuf>) -> Self {
        Self {
            working_root: std::env::temp_dir(),
            layout: FileLayout::new(file_root),
            completion_sentinel: DEFAULT_COMPLETION_SENTINEL.to_string(),
            jitter_min_secs: DEFAULT_JITTER_MIN_SECS,
            jitter_max_secs: DEFAULT_JITTER_MAX_SECS,
        }
    }
}
