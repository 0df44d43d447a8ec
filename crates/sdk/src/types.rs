//! SDK Request/Response Types
//!
//! Requests mirror the argument maps the daemon accepts; responses are the
//! core wire types.

use serde::Serialize;
use std::collections::BTreeMap;

pub use jumper_core::domain::{
    CoreEvent, CoreStateReport, CoreStatus, InspectReport, InstallReport, KernelLogLevel,
    KernelLogLine, PlatformCapabilities, RuntimeMode, SystemProxyStatus, TrayStatus,
};
pub use jumper_core::ErrorCode;

/// startCore / restartCore arguments
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_options: Option<LaunchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
}

/// How to launch the managed process
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub binary_path: String,
    pub arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl LaunchOptions {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}

/// setupRuntime / inspectRuntime arguments
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeRequest {
    pub version: String,
    pub platform_arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}
