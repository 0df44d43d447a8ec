//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP and WebSocket on one localhost port.

use crate::handler::RpcHandler;
use crate::types::{
    CORE_EVENT_NOTIFICATION, INVOKE_METHOD, KERNEL_LOG_NOTIFICATION, SUBSCRIBE_CORE_EVENTS,
    SUBSCRIBE_KERNEL_LOGS, UNSUBSCRIBE_CORE_EVENTS, UNSUBSCRIBE_KERNEL_LOGS,
};
use jsonrpsee::core::{RegisterMethodError, SubscriptionResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::{PendingSubscriptionSink, RpcModule, SubscriptionMessage};
use jumper_core::application::{CommandName, CoreService};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register method: {0}")]
    Register(#[from] RegisterMethodError),
}

/// A started server: where it listens and how to stop it
pub struct RunningServer {
    pub local_addr: SocketAddr,
    pub handle: ServerHandle,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, core: Arc<CoreService>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(core)),
        }
    }

    /// All command methods, `invoke` and the two subscriptions
    pub fn build_module(&self) -> Result<RpcModule<()>, ServerError> {
        let mut module = RpcModule::new(());

        for command in CommandName::ALL {
            let handler = self.handler.clone();
            module.register_async_method(command.as_str(), move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let arguments: Value = params.parse()?;
                    handler.call(command.as_str(), arguments).await
                }
            })?;
        }

        let handler = self.handler.clone();
        module.register_async_method(INVOKE_METHOD, move |params, _, _| {
            let handler = handler.clone();
            async move {
                let request: Value = params.parse()?;
                handler.invoke(request).await
            }
        })?;

        let events = self.handler.core().events().clone();
        module.register_subscription(
            SUBSCRIBE_CORE_EVENTS,
            CORE_EVENT_NOTIFICATION,
            UNSUBSCRIBE_CORE_EVENTS,
            move |_params, pending, _ctx, _ext| {
                let rx = events.subscribe_core();
                async move { forward_broadcast(pending, rx, "core_events").await }
            },
        )?;

        let events = self.handler.core().events().clone();
        module.register_subscription(
            SUBSCRIBE_KERNEL_LOGS,
            KERNEL_LOG_NOTIFICATION,
            UNSUBSCRIBE_KERNEL_LOGS,
            move |_params, pending, _ctx, _ext| {
                let rx = events.subscribe_logs();
                async move { forward_broadcast(pending, rx, "kernel_logs").await }
            },
        )?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Binding port 0 picks a free port; see `RunningServer::local_addr`.
    pub async fn start(self) -> Result<RunningServer, ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let module = self.build_module()?;

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!(
            addr = %local_addr,
            methods = module.method_names().count(),
            "JSON-RPC server listening (HTTP + WebSocket)"
        );

        let handle = server.start(module);
        Ok(RunningServer { local_addr, handle })
    }
}

/// Pump a broadcast channel into one subscription until either side closes
async fn forward_broadcast<T>(
    pending: PendingSubscriptionSink,
    mut rx: broadcast::Receiver<T>,
    stream: &'static str,
) -> SubscriptionResult
where
    T: Serialize + Clone + Send + 'static,
{
    let sink = pending.accept().await?;
    debug!(stream = stream, subscription = ?sink.subscription_id(), "Subscriber attached");

    loop {
        tokio::select! {
            _ = sink.closed() => break,
            item = rx.recv() => match item {
                Ok(item) => {
                    let message = SubscriptionMessage::from_json(&item)?;
                    if sink.send(message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(stream = stream, skipped = skipped, "Subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!(stream = stream, "Subscriber detached");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jumper_core::application::EventHub;
    use jumper_core::port::platform_probe::mocks::FixedPlatformProbe;
    use jumper_core::port::process_launcher::mocks::MockProcessLauncher;
    use jumper_core::port::runtime_storage::mocks::MemoryRuntimeStorage;
    use jumper_core::port::time_provider::SystemTimeProvider;

    fn core() -> Arc<CoreService> {
        Arc::new(CoreService::new(
            Arc::new(MockProcessLauncher::new()),
            Arc::new(MemoryRuntimeStorage::new("/rt")),
            Arc::new(FixedPlatformProbe::new("Linux 6.1.0")),
            Arc::new(SystemTimeProvider),
            EventHub::new(),
        ))
    }

    #[test]
    fn test_module_exposes_every_command() {
        let module = RpcServer::new(RpcServerConfig::default(), core())
            .build_module()
            .unwrap();
        let names: Vec<&str> = module.method_names().collect();

        for command in CommandName::ALL {
            assert!(names.contains(&command.as_str()), "missing {command}");
        }
        for name in [
            INVOKE_METHOD,
            SUBSCRIBE_CORE_EVENTS,
            UNSUBSCRIBE_CORE_EVENTS,
            SUBSCRIBE_KERNEL_LOGS,
            UNSUBSCRIBE_KERNEL_LOGS,
        ] {
            assert!(names.contains(&name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_module_call_round_trip() {
        let module = RpcServer::new(RpcServerConfig::default(), core())
            .build_module()
            .unwrap();

        let state: Value = module
            .call("getCoreState", jsonrpsee::rpc_params![])
            .await
            .unwrap();

        assert_eq!(state["status"], "stopped");
    }

    #[tokio::test]
    async fn test_start_on_ephemeral_port() {
        let config = RpcServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        let running = RpcServer::new(config, core()).start().await.unwrap();

        assert_ne!(running.local_addr.port(), 0);
        running.handle.stop().unwrap();
    }
}
