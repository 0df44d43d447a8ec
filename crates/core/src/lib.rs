// Jumper Core - Domain Logic & Ports
// NO infrastructure dependencies (hexagonal layout: adapters live in infra-system)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, CommandError, ErrorCode, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
