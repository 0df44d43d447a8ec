// Jumper Infrastructure - System Adapters
// Implements: ProcessLauncher, RuntimeStorage, PlatformProbe

pub mod platform_probe;
pub mod process_launcher;
pub mod runtime_storage;

pub use platform_probe::SysinfoPlatformProbe;
pub use process_launcher::TokioProcessLauncher;
pub use runtime_storage::LocalRuntimeStorage;
