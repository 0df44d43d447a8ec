// Platform probe implementation
// reason: sysinfo for cross-platform OS name/version lookup
use sysinfo::System;

use jumper_core::port::PlatformProbe;

/// Formats the host OS the way the UI displays it
/// ("Linux 6.1.0", "macOS 14.4.1", "Windows 10.0.22631")
pub struct SysinfoPlatformProbe;

impl PlatformProbe for SysinfoPlatformProbe {
    fn platform_version(&self) -> String {
        format_version(
            std::env::consts::OS,
            System::kernel_version(),
            System::os_version(),
        )
    }
}

fn format_version(os: &str, kernel: Option<String>, os_version: Option<String>) -> String {
    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| "unknown".to_string());
    match os {
        "linux" => format!("Linux {}", or_unknown(kernel)),
        "macos" => format!("macOS {}", or_unknown(os_version)),
        "windows" => format!("Windows {}", or_unknown(os_version)),
        other => format!("{} {}", other, or_unknown(kernel.or(os_version))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_uses_kernel_release() {
        let version = format_version("linux", Some("6.1.0".into()), Some("12".into()));
        assert_eq!(version, "Linux 6.1.0");
    }

    #[test]
    fn test_macos_uses_os_version() {
        let version = format_version("macos", Some("23.4.0".into()), Some("14.4.1".into()));
        assert_eq!(version, "macOS 14.4.1");
    }

    #[test]
    fn test_missing_version() {
        assert_eq!(format_version("windows", None, None), "Windows unknown");
    }

    #[test]
    fn test_probe_is_prefixed() {
        let version = SysinfoPlatformProbe.platform_version();
        assert!(!version.is_empty());
        #[cfg(target_os = "linux")]
        assert!(version.starts_with("Linux "));
    }
}
