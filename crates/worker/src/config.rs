use std::path::PathBuf;
use std::time::Duration;

use m4db_client::RetryPolicy;
use m4db_core::postprocessing::merrill_stdout::DEFAULT_COMPLETION_SENTINEL;
use m4db_pipeline::config::{DEFAULT_JITTER_MAX_SECS, DEFAULT_JITTER_MIN_SECS};
use m4db_pipeline::RunnerConfig;

/// Errors building [`WorkerConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Job runner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    pub file_root: PathBuf,
    pub working_root: PathBuf,
    pub retry: RetryPolicy,
    /// Per-request coordinator timeout.
    pub request_timeout: Duration,
    pub jitter_min_secs: u64,
    pub jitter_max_secs: u64,
    pub completion_sentinel: String,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                       |
    /// |------------------------------|-------------------------------|
    /// | `COORDINATOR_URL`            | required                      |
    /// | `M4DB_FILE_ROOT`             | required                      |
    /// | `M4DB_WORKING_ROOT`          | system temp dir               |
    /// | `COORDINATOR_RETRIES`        | `5`                           |
    /// | `COORDINATOR_BACKOFF_MS`     | `500`                         |
    /// | `COORDINATOR_MAX_BACKOFF_MS` | `30000`                       |
    /// | `COORDINATOR_TIMEOUT_SECS`   | `30`                          |
    /// | `JITTER_MIN_SECS`            | `1`                           |
    /// | `JITTER_MAX_SECS`            | `20`                          |
    /// | `COMPLETION_SENTINEL`        | `Merrill script run complete` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            var(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let coordinator_url = required("COORDINATOR_URL")?;
        let file_root = PathBuf::from(required("M4DB_FILE_ROOT")?);
        let working_root = var("M4DB_WORKING_ROOT")
            .filter(|v| !v.is_empty())
            .map_or_else(std::env::temp_dir, PathBuf::from);

        let retry = RetryPolicy {
            max_retries: parse_or(&var, "COORDINATOR_RETRIES", 5)?,
            initial_delay: Duration::from_millis(parse_or(&var, "COORDINATOR_BACKOFF_MS", 500)?),
            max_delay: Duration::from_millis(parse_or(&var, "COORDINATOR_MAX_BACKOFF_MS", 30_000)?),
            ..RetryPolicy::default()
        };
        let request_timeout = Duration::from_secs(parse_or(&var, "COORDINATOR_TIMEOUT_SECS", 30)?);

        let jitter_min_secs = parse_or(&var, "JITTER_MIN_SECS", DEFAULT_JITTER_MIN_SECS)?;
        let jitter_max_secs = parse_or(&var, "JITTER_MAX_SECS", DEFAULT_JITTER_MAX_SECS)?;
        if jitter_min_secs > jitter_max_secs {
            return Err(ConfigError::Invalid {
                var: "JITTER_MIN_SECS",
                value: format!("{jitter_min_secs} (greater than JITTER_MAX_SECS)"),
            });
        }
        let completion_sentinel = var("COMPLETION_SENTINEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_COMPLETION_SENTINEL.into());

        Ok(Self {
            coordinator_url,
            file_root,
            working_root,
            retry,
            request_timeout,
            jitter_min_secs,
            jitter_max_secs,
            completion_sentinel,
        })
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            working_root: self.working_root.clone(),
            completion_sentinel: self.completion_sentinel.clone(),
            jitter_min_secs: self.jitter_min_secs,
            jitter_max_secs: self.jitter_max_secs,
            ..RunnerConfig::new(&self.file_root)
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var: name, value }),
    }
}
