// Runtime Payload Domain Model
// Source/destination layout of the versioned sing-box runtime

use crate::domain::error::ProvisionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name of the per-user runtime root
pub const RUNTIME_DIR_NAME: &str = "jumper-runtime";

/// Installed file names inside the runtime root
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const VERSION_FILE_NAME: &str = "VERSION";

/// Source asset layout under `basePath`
const ASSETS_DIR: &str = "engine/runtime-assets";
const SOURCE_CONFIG_NAME: &str = "minimal-config.json";
const BINARY_STEM: &str = "sing-box";

/// `sing-box` or `sing-box.exe`
pub fn binary_file_name() -> String {
    format!("{}{}", BINARY_STEM, std::env::consts::EXE_SUFFIX)
}

/// Provisioning request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRequest {
    version: String,
    platform_arch: String,
    base_path: Option<PathBuf>,
}

impl RuntimeRequest {
    /// Validate and build a request
    ///
    /// Empty `base_path` counts as absent.
    ///
    /// # Errors
    /// - ProvisionError::MissingField for an absent/empty `version` or `platformArch`
    pub fn new(
        version: Option<String>,
        platform_arch: Option<String>,
        base_path: Option<String>,
    ) -> Result<Self, ProvisionError> {
        let version = version
            .filter(|v| !v.is_empty())
            .ok_or(ProvisionError::MissingField("version"))?;
        let platform_arch = platform_arch
            .filter(|a| !a.is_empty())
            .ok_or(ProvisionError::MissingField("platformArch"))?;
        let base_path = base_path.filter(|b| !b.is_empty()).map(PathBuf::from);

        Ok(Self {
            version,
            platform_arch,
            base_path,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn platform_arch(&self) -> &str {
        &self.platform_arch
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Base path for installs
    ///
    /// # Errors
    /// - ProvisionError::MissingField("basePath") when absent
    pub fn require_base_path(&self) -> Result<&Path, ProvisionError> {
        self.base_path()
            .ok_or(ProvisionError::MissingField("basePath"))
    }

    fn assets_dir(&self, base: &Path) -> PathBuf {
        base.join(ASSETS_DIR).join(&self.platform_arch)
    }

    /// `{base}/engine/runtime-assets/{arch}/sing-box-{version}-{arch}/sing-box[.exe]`
    pub fn source_binary(&self, base: &Path) -> PathBuf {
        self.assets_dir(base)
            .join(format!(
                "{}-{}-{}",
                BINARY_STEM, self.version, self.platform_arch
            ))
            .join(binary_file_name())
    }

    /// `{base}/engine/runtime-assets/{arch}/minimal-config.json`
    pub fn source_config(&self, base: &Path) -> PathBuf {
        self.assets_dir(base).join(SOURCE_CONFIG_NAME)
    }
}

/// Fixed destination layout inside a runtime root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
    root: PathBuf,
}

impl RuntimeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn binary_path(&self) -> PathBuf {
        self.root.join(binary_file_name())
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn version_path(&self) -> PathBuf {
        self.root.join(VERSION_FILE_NAME)
    }
}

/// `setupRuntime` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub installed: bool,
    pub binary_path: String,
    pub config_path: String,
    pub runtime_root: String,
}

impl InstallReport {
    pub fn installed(layout: &RuntimeLayout) -> Self {
        Self {
            installed: true,
            binary_path: display(&layout.binary_path()),
            config_path: display(&layout.config_path()),
            runtime_root: display(layout.root()),
        }
    }
}

/// `inspectRuntime` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub ready: bool,
    pub binary_path: String,
    pub config_path: String,
    pub binary_exists: bool,
    pub config_exists: bool,
    pub runtime_version: String,
    pub expected_version: String,
    pub version_matches: bool,
}

impl InspectReport {
    /// Combine the observed on-disk facts into a report
    ///
    /// `marker` is the raw VERSION file contents; `None` (missing or
    /// unreadable) is treated as an empty version.
    pub fn evaluate(
        layout: &RuntimeLayout,
        request: &RuntimeRequest,
        binary_exists: bool,
        config_exists: bool,
        marker: Option<String>,
    ) -> Self {
        let runtime_version = marker.as_deref().unwrap_or_default().trim().to_string();
        let version_matches = runtime_version == request.version();

        Self {
            ready: binary_exists && config_exists && version_matches,
            binary_path: display(&layout.binary_path()),
            config_path: display(&layout.config_path()),
            binary_exists,
            config_exists,
            runtime_version,
            expected_version: request.version().to_string(),
            version_matches,
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
