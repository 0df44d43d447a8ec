//! RPC Error Types
//!
//! Maps command errors to JSON-RPC error objects. The numeric code groups
//! failures; `data.code` carries the exact string code.

use jsonrpsee::types::ErrorObjectOwned;
use jumper_core::{CommandError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// RPC Error Codes
pub mod code {
    pub const INVALID_ARGUMENTS: i32 = 4000;
    pub const CAPABILITY_NOT_IMPLEMENTED: i32 = 4001;
    pub const UNKNOWN_COMMAND: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const CORE_PROCESS_FAILED: i32 = 5001;
    pub const RUNTIME_FAILED: i32 = 5002;
}

/// `data` member of every error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

pub fn rpc_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidArguments => code::INVALID_ARGUMENTS,
        ErrorCode::PlatformCapabilityNotImplemented => code::CAPABILITY_NOT_IMPLEMENTED,
        ErrorCode::UnknownCommand => code::UNKNOWN_COMMAND,
        ErrorCode::StartCoreFailed | ErrorCode::RestartCoreFailed | ErrorCode::ResetTunnelFailed => {
            code::CORE_PROCESS_FAILED
        }
        ErrorCode::SetupRuntimeFailed | ErrorCode::InspectRuntimeFailed => code::RUNTIME_FAILED,
        ErrorCode::InternalError => code::INTERNAL_ERROR,
    }
}

/// Convert CommandError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: CommandError) -> ErrorObjectOwned {
    let data = ErrorData {
        code: err.code,
        detail: err.detail,
    };
    ErrorObjectOwned::owned(rpc_code(err.code), err.message, Some(data))
}

/// Recover the CommandError carried by an error object, if it has one
pub fn from_rpc_error(err: &ErrorObjectOwned) -> Option<CommandError> {
    let data: ErrorData = serde_json::from_str(err.data()?.get()).ok()?;
    Some(CommandError {
        code: data.code,
        message: err.message().to_string(),
        detail: data.detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_failure_object() {
        let err = to_rpc_error(CommandError::new(
            ErrorCode::StartCoreFailed,
            "No such file or directory (os error 2)",
        ));

        assert_eq!(err.code(), code::CORE_PROCESS_FAILED);
        assert_eq!(err.message(), "Failed to start core process");
        let data: Value = serde_json::from_str(err.data().unwrap().get()).unwrap();
        assert_eq!(
            data,
            serde_json::json!({
                "code": "START_CORE_FAILED",
                "detail": "No such file or directory (os error 2)"
            })
        );
    }

    #[test]
    fn test_error_object_round_trip() {
        let original = CommandError::new(ErrorCode::PlatformCapabilityNotImplemented, "showTray");

        let recovered = from_rpc_error(&to_rpc_error(original.clone())).unwrap();

        assert_eq!(recovered, original);
    }

    #[test]
    fn test_foreign_error_has_no_command_error() {
        let err = ErrorObjectOwned::owned(-32602, "Invalid params", None::<()>);
        assert!(from_rpc_error(&err).is_none());
    }
}
