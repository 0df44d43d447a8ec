// Application Layer - Use Cases and Business Logic

pub mod args;
pub mod command;
pub mod constants;
pub mod core_service;
pub mod events;
pub mod provisioner;
pub mod supervisor;

// Re-exports
pub use args::{LaunchOptionsArgs, RestartCoreArgs, RuntimeArgs, StartCoreArgs};
pub use command::CommandName;
pub use core_service::CoreService;
pub use events::EventHub;
pub use provisioner::RuntimeProvisioner;
pub use supervisor::{LaunchOutcome, ProcessSupervisor};
