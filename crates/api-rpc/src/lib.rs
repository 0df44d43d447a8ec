//! JSON-RPC API Layer
//!
//! Exposes every host command as a JSON-RPC 2.0 method of the same name,
//! plus the `invoke` bridge and core event / kernel log subscriptions.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig, RunningServer, ServerError};
