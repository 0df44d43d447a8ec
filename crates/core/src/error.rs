// Central Error Types for the Application

use crate::domain::{CapabilityCommand, ProvisionError, SpawnError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Capability is not implemented on this host: {0}")]
    CapabilityUnsupported(CapabilityCommand),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Stable string codes reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StartCoreFailed,
    RestartCoreFailed,
    ResetTunnelFailed,
    SetupRuntimeFailed,
    InspectRuntimeFailed,
    PlatformCapabilityNotImplemented,
    UnknownCommand,
    InvalidArguments,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::StartCoreFailed => "START_CORE_FAILED",
            ErrorCode::RestartCoreFailed => "RESTART_CORE_FAILED",
            ErrorCode::ResetTunnelFailed => "RESET_TUNNEL_FAILED",
            ErrorCode::SetupRuntimeFailed => "SETUP_RUNTIME_FAILED",
            ErrorCode::InspectRuntimeFailed => "INSPECT_RUNTIME_FAILED",
            ErrorCode::PlatformCapabilityNotImplemented => "PLATFORM_CAPABILITY_NOT_IMPLEMENTED",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message paired with the code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::StartCoreFailed => "Failed to start core process",
            ErrorCode::RestartCoreFailed => "Failed to restart core process",
            ErrorCode::ResetTunnelFailed => "Failed to reset tunnel",
            ErrorCode::SetupRuntimeFailed => "Failed to setup runtime in container",
            ErrorCode::InspectRuntimeFailed => "Failed to inspect runtime",
            ErrorCode::PlatformCapabilityNotImplemented => {
                "Capability is not implemented on this host yet."
            }
            ErrorCode::UnknownCommand => "Unknown command",
            ErrorCode::InvalidArguments => "Invalid arguments",
            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure returned from every command
///
/// `detail` carries the underlying cause (OS error text, command name, ...).
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl CommandError {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            message: code.message().to_string(),
            detail: Some(Value::String(detail.into())),
        }
    }

    /// Map an application error, using `failure` for operation-level causes
    ///
    /// Spawn and provisioning failures take the code of the command that
    /// hit them; argument, capability and routing errors keep their own.
    pub fn from_app(failure: ErrorCode, err: AppError) -> Self {
        match err {
            AppError::Spawn(e) => match e {
                SpawnError::Os { reason, .. } => Self::new(failure, reason),
            },
            AppError::Provision(e) => Self::new(failure, e.to_string()),
            AppError::CapabilityUnsupported(command) => {
                Self::new(ErrorCode::PlatformCapabilityNotImplemented, command.as_str())
            }
            AppError::UnknownCommand(name) => Self::new(ErrorCode::UnknownCommand, name),
            AppError::InvalidArguments(msg) => Self::new(ErrorCode::InvalidArguments, msg),
            other => Self::new(ErrorCode::InternalError, other.to_string()),
        }
    }

    /// Detail rendered as plain text
    pub fn detail_text(&self) -> Option<String> {
        self.detail.as_ref().map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_takes_command_code() {
        let err = AppError::from(SpawnError::os("/nope", "No such file or directory"));
        let mapped = CommandError::from_app(ErrorCode::RestartCoreFailed, err);

        assert_eq!(mapped.code, ErrorCode::RestartCoreFailed);
        assert_eq!(mapped.message, "Failed to restart core process");
        assert_eq!(mapped.detail_text().as_deref(), Some("No such file or directory"));
    }

    #[test]
    fn test_capability_keeps_own_code() {
        let err = AppError::CapabilityUnsupported(CapabilityCommand::ShowTray);
        let mapped = CommandError::from_app(ErrorCode::StartCoreFailed, err);

        assert_eq!(mapped.code, ErrorCode::PlatformCapabilityNotImplemented);
        assert_eq!(mapped.detail_text().as_deref(), Some("showTray"));
    }

    #[test]
    fn test_code_wire_name_matches_as_str() {
        for code in [
            ErrorCode::StartCoreFailed,
            ErrorCode::PlatformCapabilityNotImplemented,
            ErrorCode::InvalidArguments,
        ] {
            let value = serde_json::to_value(code).unwrap();
            assert_eq!(value, Value::String(code.as_str().to_string()));
        }
    }
}
