// Command names accepted by the dispatcher

use crate::error::{AppError, ErrorCode};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    GetPlatformVersion,
    StartCore,
    StopCore,
    RestartCore,
    ResetTunnel,
    GetCoreState,
    SetupRuntime,
    InspectRuntime,
    GetPlatformCapabilities,
    EnableSystemProxy,
    DisableSystemProxy,
    GetSystemProxyStatus,
    RequestNotificationPermission,
    GetNotificationPermissionStatus,
    ShowNotification,
    ShowTray,
    UpdateTray,
    HideTray,
    GetTrayStatus,
}

impl CommandName {
    pub const ALL: [CommandName; 19] = [
        CommandName::GetPlatformVersion,
        CommandName::StartCore,
        CommandName::StopCore,
        CommandName::RestartCore,
        CommandName::ResetTunnel,
        CommandName::GetCoreState,
        CommandName::SetupRuntime,
        CommandName::InspectRuntime,
        CommandName::GetPlatformCapabilities,
        CommandName::EnableSystemProxy,
        CommandName::DisableSystemProxy,
        CommandName::GetSystemProxyStatus,
        CommandName::RequestNotificationPermission,
        CommandName::GetNotificationPermissionStatus,
        CommandName::ShowNotification,
        CommandName::ShowTray,
        CommandName::UpdateTray,
        CommandName::HideTray,
        CommandName::GetTrayStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::GetPlatformVersion => "getPlatformVersion",
            CommandName::StartCore => "startCore",
            CommandName::StopCore => "stopCore",
            CommandName::RestartCore => "restartCore",
            CommandName::ResetTunnel => "resetTunnel",
            CommandName::GetCoreState => "getCoreState",
            CommandName::SetupRuntime => "setupRuntime",
            CommandName::InspectRuntime => "inspectRuntime",
            CommandName::GetPlatformCapabilities => "getPlatformCapabilities",
            CommandName::EnableSystemProxy => "enableSystemProxy",
            CommandName::DisableSystemProxy => "disableSystemProxy",
            CommandName::GetSystemProxyStatus => "getSystemProxyStatus",
            CommandName::RequestNotificationPermission => "requestNotificationPermission",
            CommandName::GetNotificationPermissionStatus => "getNotificationPermissionStatus",
            CommandName::ShowNotification => "showNotification",
            CommandName::ShowTray => "showTray",
            CommandName::UpdateTray => "updateTray",
            CommandName::HideTray => "hideTray",
            CommandName::GetTrayStatus => "getTrayStatus",
        }
    }

    /// Code reported when the operation behind this command fails
    pub fn failure_code(&self) -> ErrorCode {
        match self {
            CommandName::StartCore => ErrorCode::StartCoreFailed,
            CommandName::RestartCore => ErrorCode::RestartCoreFailed,
            CommandName::ResetTunnel => ErrorCode::ResetTunnelFailed,
            CommandName::SetupRuntime => ErrorCode::SetupRuntimeFailed,
            CommandName::InspectRuntime => ErrorCode::InspectRuntimeFailed,
            _ => ErrorCode::InternalError,
        }
    }
}

impl FromStr for CommandName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::UnknownCommand(s.to_string()))
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for command in CommandName::ALL {
            assert_eq!(command.as_str().parse::<CommandName>().unwrap(), command);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "startKernel".parse::<CommandName>().unwrap_err();
        assert!(matches!(err, AppError::UnknownCommand(name) if name == "startKernel"));
    }
}
