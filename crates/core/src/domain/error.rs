// Domain Error Types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// The OS refused to create the managed process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Failed to spawn '{binary}': {reason}")]
    Os { binary: String, reason: String },
}

impl SpawnError {
    pub fn os(binary: impl Into<String>, reason: impl ToString) -> Self {
        SpawnError::Os {
            binary: binary.into(),
            reason: reason.to_string(),
        }
    }
}

/// Runtime installation / inspection failures.
///
/// No rollback is attempted after an `Io` failure; destination files may be
/// left partially written and a retried install overwrites them.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Invalid runtime request: {0}")]
    InvalidRequest(String),

    #[error("Runtime root unavailable: {0}")]
    RootUnavailable(String),

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvisionError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
