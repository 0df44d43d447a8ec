// Launch Spec Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One intended invocation of the managed process.
///
/// Built once per start/restart request and never mutated afterwards; the
/// supervisor keeps the last successful one around so `restartCore` can be
/// called without parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpec {
    binary_path: String,
    arguments: Vec<String>,
    working_directory: Option<PathBuf>,
    environment: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Create a launch spec for `binary_path` with no arguments
    ///
    /// # Errors
    /// - DomainError::ValidationError if `binary_path` is empty
    pub fn new(binary_path: impl Into<String>) -> Result<Self> {
        let binary_path = binary_path.into();
        if binary_path.is_empty() {
            return Err(DomainError::ValidationError(
                "binaryPath must not be empty".to_string(),
            ));
        }

        Ok(Self {
            binary_path,
            arguments: Vec::new(),
            working_directory: None,
            environment: BTreeMap::new(),
        })
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Empty directories are treated as "inherit the caller's cwd".
    pub fn with_working_directory(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.working_directory = dir
            .map(Into::into)
            .filter(|d: &PathBuf| !d.as_os_str().is_empty());
        self
    }

    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Full argument vector as the OS sees it: `[binaryPath] + arguments`
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.binary_path.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_binary_rejected() {
        let result = LaunchSpec::new("");
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_argv_prepends_binary() {
        let spec = LaunchSpec::new("/opt/sing-box")
            .unwrap()
            .with_arguments(["run", "-c", "config.json"]);

        assert_eq!(spec.argv(), vec!["/opt/sing-box", "run", "-c", "config.json"]);
    }

    #[test]
    fn test_empty_working_directory_is_none() {
        let spec = LaunchSpec::new("sing-box")
            .unwrap()
            .with_working_directory(Some(""));
        assert!(spec.working_directory().is_none());

        let spec = spec.with_working_directory(Some("/var/lib/jumper"));
        assert_eq!(
            spec.working_directory(),
            Some(Path::new("/var/lib/jumper"))
        );
    }
}
