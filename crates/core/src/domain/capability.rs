// Platform capability contract
// Only tunnel supervision is real; the rest are stable placeholders callers branch on

use serde::{Deserialize, Serialize};

/// Short platform label used in payloads ("linux", "macos", "windows", ...)
pub fn current_platform() -> &'static str {
    std::env::consts::OS
}

/// `getPlatformCapabilities` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCapabilities {
    pub tunnel_supported: bool,
    pub system_proxy_supported: bool,
    pub notify_supported: bool,
    pub tray_supported: bool,
}

impl PlatformCapabilities {
    pub fn host() -> Self {
        Self {
            tunnel_supported: true,
            system_proxy_supported: false,
            notify_supported: false,
            tray_supported: false,
        }
    }
}

/// `getSystemProxyStatus` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemProxyStatus {
    pub enabled: bool,
    pub platform: String,
}

impl SystemProxyStatus {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            platform: current_platform().to_string(),
        }
    }
}

/// `getTrayStatus` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayStatus {
    pub visible: bool,
    pub title: String,
}

impl TrayStatus {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            title: String::new(),
        }
    }
}

/// Recognized commands that this host does not implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityCommand {
    EnableSystemProxy,
    DisableSystemProxy,
    RequestNotificationPermission,
    ShowNotification,
    ShowTray,
    UpdateTray,
    HideTray,
}

impl CapabilityCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityCommand::EnableSystemProxy => "enableSystemProxy",
            CapabilityCommand::DisableSystemProxy => "disableSystemProxy",
            CapabilityCommand::RequestNotificationPermission => "requestNotificationPermission",
            CapabilityCommand::ShowNotification => "showNotification",
            CapabilityCommand::ShowTray => "showTray",
            CapabilityCommand::UpdateTray => "updateTray",
            CapabilityCommand::HideTray => "hideTray",
        }
    }
}

impl std::fmt::Display for CapabilityCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
