//! SDK Error Types

use jumper_core::ErrorCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// The daemon ran the command and reported a structured failure
    #[error("{code}: {message}")]
    Command {
        code: ErrorCode,
        message: String,
        detail: Option<Value>,
    },

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// String error code, for command failures
    pub fn command_code(&self) -> Option<ErrorCode> {
        match self {
            SdkError::Command { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorData {
    code: ErrorCode,
    #[serde(default)]
    detail: Option<Value>,
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => {
                let data = call_err
                    .data()
                    .and_then(|raw| serde_json::from_str::<ErrorData>(raw.get()).ok());
                match data {
                    Some(data) => SdkError::Command {
                        code: data.code,
                        message: call_err.message().to_string(),
                        detail: data.detail,
                    },
                    None => SdkError::Rpc {
                        code: call_err.code(),
                        message: call_err.message().to_string(),
                    },
                }
            }
            jsonrpsee::core::ClientError::Transport(e) => {
                SdkError::Transport(format!("Transport error: {}", e))
            }
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("Connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => {
                SdkError::Other(format!("Parse error: {}", e))
            }
            _ => SdkError::Other(e.to_string()),
        }
    }
}
