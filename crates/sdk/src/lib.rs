//! Jumper SDK - Rust Client Library
//!
//! Typed client for the Jumper host daemon.
//!
//! # Example
//!
//! ```no_run
//! use jumper_sdk::{JumperClient, LaunchOptions, StartCoreRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JumperClient::connect("http://127.0.0.1:9630").await?;
//!
//!     client
//!         .start_core(&StartCoreRequest {
//!             launch_options: Some(LaunchOptions::new("/usr/local/bin/sing-box").arg("run")),
//!             profile_id: Some("default".to_string()),
//!             network_mode: None,
//!         })
//!         .await?;
//!
//!     let state = client.get_core_state().await?;
//!     println!("core is {} ({})", state.status, state.runtime_mode);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{EventStream, JumperClient};
pub use error::{Result, SdkError};
pub use types::{
    CoreEvent, CoreStateReport, CoreStatus, ErrorCode, InspectReport, InstallReport,
    KernelLogLevel, KernelLogLine, LaunchOptions, PlatformCapabilities, RuntimeMode,
    RuntimeRequest, StartCoreRequest, SystemProxyStatus, TrayStatus,
};
