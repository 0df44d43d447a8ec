//! RPC Request Types and Method Names

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic command bridge
pub const INVOKE_METHOD: &str = "invoke";

/// Core lifecycle event stream
pub const SUBSCRIBE_CORE_EVENTS: &str = "subscribeCoreEvents";
pub const UNSUBSCRIBE_CORE_EVENTS: &str = "unsubscribeCoreEvents";
pub const CORE_EVENT_NOTIFICATION: &str = "coreEvent";

/// Managed process output stream
pub const SUBSCRIBE_KERNEL_LOGS: &str = "subscribeKernelLogs";
pub const UNSUBSCRIBE_KERNEL_LOGS: &str = "unsubscribeKernelLogs";
pub const KERNEL_LOG_NOTIFICATION: &str = "kernelLog";

/// invoke - call any command by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Accept `[{...}]` as well as `{...}`; `[]` means no arguments
pub fn unwrap_positional(params: Value) -> Value {
    match params {
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => items.remove(0),
        Value::Array(items) if items.is_empty() => Value::Null,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_positional() {
        assert_eq!(unwrap_positional(json!([{"a": 1}])), json!({"a": 1}));
        assert_eq!(unwrap_positional(json!([])), Value::Null);
        assert_eq!(unwrap_positional(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(unwrap_positional(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_invoke_arguments_default_to_null() {
        let req: InvokeRequest = serde_json::from_value(json!({"method": "stopCore"})).unwrap();
        assert_eq!(req.arguments, Value::Null);
    }
}
