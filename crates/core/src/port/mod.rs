// Port Layer - Interfaces for external dependencies

pub mod platform_probe;
pub mod process_launcher;
pub mod runtime_storage;
pub mod time_provider;

// Re-exports
pub use platform_probe::PlatformProbe;
pub use process_launcher::{ProcessHandle, ProcessLauncher};
pub use runtime_storage::RuntimeStorage;
pub use time_provider::TimeProvider;
