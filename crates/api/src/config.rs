use std::path::PathBuf;

/// Default solver executable handed to runners when a model names none.
pub const DEFAULT_SOLVER_EXECUTABLE: &str = "merrill";

/// Errors building [`ServerConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Coordinator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Root of the shared file store (`model/`, `geometry/`).
    pub file_root: PathBuf,
    /// Registry snapshot; the registry is memory-only when unset.
    pub registry_path: Option<PathBuf>,
    pub default_solver_executable: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default    |
    /// |-----------------------------|------------|
    /// | `HOST`                      | `0.0.0.0`  |
    /// | `PORT`                      | `8080`     |
    /// | `M4DB_FILE_ROOT`            | required   |
    /// | `REGISTRY_PATH`             | unset      |
    /// | `DEFAULT_SOLVER_EXECUTABLE` | `merrill`  |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&var, "PORT", 8080)?;
        let file_root = var("M4DB_FILE_ROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("M4DB_FILE_ROOT"))?;
        let registry_path = var("REGISTRY_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let default_solver_executable = var("DEFAULT_SOLVER_EXECUTABLE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SOLVER_EXECUTABLE.into());
        let request_timeout_secs = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            host,
            port,
            file_root,
            registry_path,
            default_solver_executable,
            request_timeout_secs,
        })
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

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_vars(lookup(&[("M4DB_FILE_ROOT", "/srv/m4db")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_solver_executable, "merrill");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.registry_path.is_none());
    }

    #[test]
    fn file_root_is_required() {
        assert_matches!(
            ServerConfig::from_vars(lookup(&[])),
            Err(ConfigError::Missing("M4DB_FILE_ROOT"))
        );
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = ServerConfig::from_vars(lookup(&[
            ("M4DB_FILE_ROOT", "/srv/m4db"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });
    }
}
