//! Daemon configuration
//!
//! Layered: built-in defaults, then `<config dir>/jumper/hostd.toml` (or the
//! file named by `JUMPER_CONFIG`), then `JUMPER_*` environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::BaseDirs;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_PATH_VAR: &str = "JUMPER_CONFIG";
const ENV_PREFIX: &str = "JUMPER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    pub runtime_root: Option<String>,
    pub stop_grace_ms: u64,
    pub log_format: LogFormat,
    pub log_dir: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 9630,
            runtime_root: None,
            stop_grace_ms: 2000,
            log_format: LogFormat::Pretty,
            log_dir: None,
        }
    }
}

impl DaemonConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .or_else(default_config_path);
        Self::load_from(path)
    }

    /// Load from an explicit file (missing is fine) and the environment
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::file_layer(path)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    fn file_layer(path: Option<PathBuf>) -> ConfigBuilder<DefaultState> {
        let builder = Config::builder();
        match path {
            Some(path) => {
                builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
            }
            None => builder,
        }
    }

    pub fn stop_grace_period(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    /// `runtime_root` with `~` and env vars expanded
    pub fn runtime_root(&self) -> Option<PathBuf> {
        self.runtime_root.as_deref().map(expand_path)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir.as_deref().map(expand_path)
    }
}

fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("jumper").join("hostd.toml"))
}

fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // File layer only, without the JUMPER_* environment source
    fn load_file(path: PathBuf) -> DaemonConfig {
        DaemonConfig::file_layer(Some(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = load_file(dir.path().join("absent.toml"));

        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.stop_grace_period(), Duration::from_secs(2));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostd.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "rpc_port = 9700").unwrap();
        writeln!(file, "log_format = \"json\"").unwrap();
        writeln!(file, "runtime_root = \"/srv/jumper\"").unwrap();

        let config = load_file(path);

        assert_eq!(config.rpc_port, 9700);
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.runtime_root(), Some(PathBuf::from("/srv/jumper")));
    }

    #[test]
    fn test_tilde_is_expanded() {
        let config = DaemonConfig {
            log_dir: Some("~/logs".to_string()),
            ..DaemonConfig::default()
        };

        let dir = config.log_dir().unwrap();

        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with("logs"));
    }
}
