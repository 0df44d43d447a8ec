//! Jumper Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    CoreEvent, CoreStateReport, InspectReport, InstallReport, KernelLogLine,
    PlatformCapabilities, RuntimeRequest, StartCoreRequest,
};
use futures::StreamExt;
use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Jumper host daemon client
///
/// Commands go over HTTP. Event streams open their own WebSocket
/// connection on the same port.
///
/// # Example
///
/// ```no_run
/// use jumper_sdk::JumperClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = JumperClient::connect("http://127.0.0.1:9630").await?;
/// println!("{}", client.get_platform_version().await?);
/// # Ok(())
/// # }
/// ```
pub struct JumperClient {
    client: HttpClient,
    ws_url: String,
}

impl JumperClient {
    /// Connect to the daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9630`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            ws_url: websocket_url(url),
        })
    }

    pub async fn get_platform_version(&self) -> Result<String> {
        self.call("getPlatformVersion", rpc_params![]).await
    }

    /// Start the core, replacing any running process
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use jumper_sdk::{JumperClient, LaunchOptions, StartCoreRequest};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = JumperClient::connect("http://127.0.0.1:9630").await?;
    /// client.start_core(&StartCoreRequest {
    ///     launch_options: Some(LaunchOptions::new("/opt/jumper/sing-box").args(["run", "-c", "config.json"])),
    ///     ..Default::default()
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_core(&self, request: &StartCoreRequest) -> Result<()> {
        self.call::<Value>("startCore", rpc_params![request]).await?;
        Ok(())
    }

    pub async fn stop_core(&self) -> Result<()> {
        self.call::<Value>("stopCore", rpc_params![]).await?;
        Ok(())
    }

    /// Restart the core; without launch options the last real launch is reused
    pub async fn restart_core(&self, request: &StartCoreRequest) -> Result<()> {
        self.call::<Value>("restartCore", rpc_params![request]).await?;
        Ok(())
    }

    pub async fn reset_tunnel(&self) -> Result<()> {
        self.call::<Value>("resetTunnel", rpc_params![]).await?;
        Ok(())
    }

    pub async fn get_core_state(&self) -> Result<CoreStateReport> {
        self.call("getCoreState", rpc_params![]).await
    }

    /// Install the runtime from `basePath` into the daemon's runtime root
    pub async fn setup_runtime(&self, request: &RuntimeRequest) -> Result<InstallReport> {
        self.call("setupRuntime", rpc_params![request]).await
    }

    pub async fn inspect_runtime(&self, request: &RuntimeRequest) -> Result<InspectReport> {
        self.call("inspectRuntime", rpc_params![request]).await
    }

    pub async fn get_platform_capabilities(&self) -> Result<PlatformCapabilities> {
        self.call("getPlatformCapabilities", rpc_params![]).await
    }

    /// Call any command by name through the `invoke` bridge
    pub async fn invoke(&self, method: &str, arguments: Value) -> Result<Value> {
        let request = serde_json::json!({ "method": method, "arguments": arguments });
        self.call("invoke", rpc_params![request]).await
    }

    /// Lifecycle events, one per session transition
    pub async fn subscribe_core_events(&self) -> Result<EventStream<CoreEvent>> {
        self.subscribe("subscribeCoreEvents", "unsubscribeCoreEvents").await
    }

    /// Managed process output, line by line
    pub async fn subscribe_kernel_logs(&self) -> Result<EventStream<KernelLogLine>> {
        self.subscribe("subscribeKernelLogs", "unsubscribeKernelLogs").await
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: ArrayParams) -> Result<R> {
        let response: R = self.client.request(method, params).await?;
        Ok(response)
    }

    async fn subscribe<T: DeserializeOwned>(
        &self,
        subscribe: &str,
        unsubscribe: &str,
    ) -> Result<EventStream<T>> {
        let client = WsClientBuilder::default()
            .build(&self.ws_url)
            .await
            .map_err(|e| SdkError::Connection(format!("Failed to open WebSocket: {}", e)))?;
        let subscription = client
            .subscribe(subscribe, rpc_params![], unsubscribe)
            .await?;

        Ok(EventStream {
            subscription,
            _client: client,
        })
    }
}

/// Live notification stream; owns the WebSocket it arrives on
pub struct EventStream<T> {
    subscription: Subscription<T>,
    _client: WsClient,
}

impl<T: DeserializeOwned + Unpin> EventStream<T> {
    /// Next notification, `None` once the daemon closes the stream
    pub async fn next(&mut self) -> Option<Result<T>> {
        self.subscription
            .next()
            .await
            .map(|item| item.map_err(SdkError::from))
    }

    pub async fn unsubscribe(self) -> Result<()> {
        self.subscription.unsubscribe().await?;
        Ok(())
    }
}

fn websocket_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url() {
        assert_eq!(websocket_url("http://127.0.0.1:9630"), "ws://127.0.0.1:9630");
        assert_eq!(websocket_url("https://host:1"), "wss://host:1");
        assert_eq!(websocket_url("ws://host:1"), "ws://host:1");
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = JumperClient::connect("ftp://127.0.0.1:9630").await;
        assert!(matches!(result, Err(SdkError::Connection(_))));
    }
}
