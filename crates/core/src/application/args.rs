// Command argument parsing
// Loosely typed argument maps become typed structs at the command boundary

use crate::domain::{LaunchSpec, ProvisionError, RuntimeRequest};
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// `startCore` / `restartCore` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCoreArgs {
    #[serde(default)]
    pub launch_options: Option<LaunchOptionsArgs>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub network_mode: Option<String>,
}

pub type RestartCoreArgs = StartCoreArgs;

impl StartCoreArgs {
    /// Launch spec carried by these arguments, if usable
    pub fn launch_spec(&self) -> Option<LaunchSpec> {
        self.launch_options.as_ref().and_then(LaunchOptionsArgs::to_spec)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptionsArgs {
    #[serde(default)]
    pub binary_path: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub environment: Option<BTreeMap<String, String>>,
}

impl LaunchOptionsArgs {
    /// Options without a non-empty `binaryPath` count as no options at all
    pub fn to_spec(&self) -> Option<LaunchSpec> {
        let binary = self.binary_path.as_deref().filter(|b| !b.is_empty())?;
        let spec = LaunchSpec::new(binary)
            .ok()?
            .with_arguments(self.arguments.iter().flatten().cloned())
            .with_working_directory(self.working_directory.clone())
            .with_environment(self.environment.clone().unwrap_or_default());
        Some(spec)
    }
}

/// `setupRuntime` / `inspectRuntime` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeArgs {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub platform_arch: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
}

impl RuntimeArgs {
    pub fn into_request(self) -> std::result::Result<RuntimeRequest, ProvisionError> {
        RuntimeRequest::new(self.version, self.platform_arch, self.base_path)
    }
}

/// Parse a named-argument map; null means "no arguments"
///
/// # Errors
/// - AppError::InvalidArguments for non-map arguments or mistyped fields
pub fn parse_args<T>(arguments: Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match arguments {
        Value::Null => Ok(T::default()),
        Value::Object(_) => serde_json::from_value(arguments)
            .map_err(|e| AppError::InvalidArguments(e.to_string())),
        other => Err(AppError::InvalidArguments(format!(
            "expected an argument map, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse runtime arguments; shape problems are provisioning failures
pub fn parse_runtime_request(arguments: Value) -> std::result::Result<RuntimeRequest, ProvisionError> {
    parse_args::<RuntimeArgs>(arguments)
        .map_err(|e| match e {
            AppError::InvalidArguments(msg) => ProvisionError::InvalidRequest(msg),
            other => ProvisionError::InvalidRequest(other.to_string()),
        })?
        .into_request()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_null_is_empty_map() {
        let args: StartCoreArgs = parse_args(Value::Null).unwrap();
        assert_eq!(args, StartCoreArgs::default());
    }

    #[test]
    fn test_full_launch_options() {
        let args: StartCoreArgs = parse_args(json!({
            "profileId": "p1",
            "networkMode": "system_proxy",
            "launchOptions": {
                "binaryPath": "/opt/sing-box",
                "arguments": ["run", "-c", "config.json"],
                "workingDirectory": "/opt",
                "environment": {"ENABLE_DEPRECATED": "true"}
            }
        }))
        .unwrap();

        let spec = args.launch_spec().unwrap();
        assert_eq!(spec.argv(), vec!["/opt/sing-box", "run", "-c", "config.json"]);
        assert_eq!(spec.working_directory(), Some(Path::new("/opt")));
        assert_eq!(spec.environment().get("ENABLE_DEPRECATED").map(String::as_str), Some("true"));
        assert_eq!(args.profile_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_working_directory_only_is_no_launch() {
        let args: StartCoreArgs =
            parse_args(json!({"launchOptions": {"workingDirectory": "/tmp"}})).unwrap();
        assert!(args.launch_spec().is_none());

        let args: StartCoreArgs =
            parse_args(json!({"launchOptions": {"binaryPath": ""}})).unwrap();
        assert!(args.launch_spec().is_none());
    }

    #[test]
    fn test_non_map_rejected() {
        let err = parse_args::<StartCoreArgs>(json!([1, 2])).unwrap_err();
        assert!(matches!(err, AppError::InvalidArguments(_)));
    }

    #[test]
    fn test_mistyped_field_rejected() {
        let err = parse_args::<StartCoreArgs>(json!({"profileId": 42})).unwrap_err();
        assert!(matches!(err, AppError::InvalidArguments(_)));
    }

    #[test]
    fn test_runtime_shape_errors_are_provisioning_errors() {
        assert!(matches!(
            parse_runtime_request(json!("1.0.0")),
            Err(ProvisionError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_runtime_request(json!({"platformArch": "linux-amd64"})),
            Err(ProvisionError::MissingField("version"))
        ));
    }
}
