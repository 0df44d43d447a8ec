// Domain Layer - Session state, launch and runtime descriptions

pub mod capability;
pub mod error;
pub mod event;
pub mod launch;
pub mod runtime;
pub mod session;

// Re-exports
pub use capability::{
    current_platform, CapabilityCommand, PlatformCapabilities, SystemProxyStatus, TrayStatus,
};
pub use error::{DomainError, ProvisionError, SpawnError};
pub use event::{CoreEvent, CoreStatePayload, KernelLogLevel, KernelLogLine, KernelLogSender};
pub use launch::LaunchSpec;
pub use runtime::{InspectReport, InstallReport, RuntimeLayout, RuntimeRequest};
pub use session::{CoreStateReport, CoreStatus, RuntimeMode, SessionState, DEFAULT_NETWORK_MODE};
