// Core events published to subscribers

use crate::domain::session::CoreStateReport;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Lifecycle notification, emitted after every session transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    #[serde(rename_all = "camelCase")]
    CoreStateChanged {
        timestamp_ms: i64,
        payload: CoreStatePayload,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStatePayload {
    #[serde(flatten)]
    pub state: CoreStateReport,
    pub message: String,
}

impl CoreEvent {
    pub fn state_changed(timestamp_ms: i64, state: CoreStateReport, message: impl Into<String>) -> Self {
        CoreEvent::CoreStateChanged {
            timestamp_ms,
            payload: CoreStatePayload {
                state,
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelLogLevel {
    Info,
    Error,
}

/// One line of managed-process output (stdout = info, stderr = error)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelLogLine {
    pub level: KernelLogLevel,
    pub message: String,
    pub timestamp_ms: i64,
}

/// Sender handed to process adapters for output forwarding
pub type KernelLogSender = broadcast::Sender<KernelLogLine>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionState;
    use serde_json::json;

    #[test]
    fn test_state_changed_wire_shape() {
        let mut state = SessionState::default();
        state.mark_simulated(1_700_000_000_000);

        let event = CoreEvent::state_changed(1_700_000_000_001, state.report(), "core started");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "core_state_changed",
                "timestampMs": 1_700_000_000_001_i64,
                "payload": {
                    "status": "running",
                    "runtimeMode": "simulator",
                    "networkMode": "tunnel",
                    "pid": 1_700_000_000_000_u64,
                    "message": "core started"
                }
            })
        );
    }
}
