// Platform Probe Port

/// Reports host OS information
pub trait PlatformProbe: Send + Sync {
    /// Human-readable OS name and version, e.g. "Linux 6.1.0" or "macOS 14.4.1"
    fn platform_version(&self) -> String;
}

pub mod mocks {
    use super::*;

    /// Probe returning a fixed string
    pub struct FixedPlatformProbe(pub String);

    impl FixedPlatformProbe {
        pub fn new(version: impl Into<String>) -> Self {
            Self(version.into())
        }
    }

    impl PlatformProbe for FixedPlatformProbe {
        fn platform_version(&self) -> String {
            self.0.clone()
        }
    }
}
