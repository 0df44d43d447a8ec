//! Jumper Host Daemon - Main Entry Point
//!
//! Owns the core service for the lifetime of the process and serves it over
//! JSON-RPC until Ctrl+C.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use config::DaemonConfig;
use jumper_api_rpc::{RpcServer, RpcServerConfig};
use jumper_core::application::{CoreService, EventHub};
use jumper_core::port::time_provider::SystemTimeProvider;
use jumper_core::port::TimeProvider;
use jumper_infra_system::{LocalRuntimeStorage, SysinfoPlatformProbe, TokioProcessLauncher};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (defaults -> hostd.toml -> JUMPER_*)
    let config = DaemonConfig::load().context("Failed to load configuration")?;

    // 2. Initialize logging; keep the guard so the file log flushes on exit
    let _log_guard = telemetry::init_logging(&config)?;

    info!("Jumper host daemon v{} starting...", VERSION);

    // 3. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let launcher = Arc::new(TokioProcessLauncher::new(time_provider.clone()));
    let storage = Arc::new(LocalRuntimeStorage::with_root(config.runtime_root()));
    let platform_probe = Arc::new(SysinfoPlatformProbe);

    let core = Arc::new(
        CoreService::new(
            launcher,
            storage,
            platform_probe,
            time_provider,
            EventHub::new(),
        )
        .with_stop_grace_period(config.stop_grace_period()),
    );

    info!(
        platform = %core.platform_version(),
        stop_grace_ms = config.stop_grace_ms,
        "Core service ready"
    );

    // 4. Start JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let server = RpcServer::new(rpc_config, core.clone())
        .start()
        .await
        .context("RPC server start failed")?;

    info!(addr = %server.local_addr, "System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown: managed process first, then the listener
    core.shutdown().await;
    if let Err(e) = server.handle.stop() {
        error!(error = %e, "RPC server already stopped");
    }
    server.handle.stopped().await;

    telemetry::shutdown();
    info!("Shutdown complete.");

    Ok(())
}
