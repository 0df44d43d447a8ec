//! RPC Method Handlers
//!
//! Thin bridge from JSON-RPC params to the core command dispatcher.

use crate::error::to_rpc_error;
use crate::types::{unwrap_positional, InvokeRequest};
use jsonrpsee::types::ErrorObjectOwned;
use jumper_core::application::CoreService;
use jumper_core::{CommandError, ErrorCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected core service
pub struct RpcHandler {
    core: Arc<CoreService>,
}

impl RpcHandler {
    pub fn new(core: Arc<CoreService>) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &Arc<CoreService> {
        &self.core
    }

    /// Run `method` with raw JSON-RPC params
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ErrorObjectOwned> {
        debug!(method = %method, "RPC call");
        self.core
            .dispatch(method, unwrap_positional(params))
            .await
            .map_err(to_rpc_error)
    }

    /// invoke
    pub async fn invoke(&self, params: Value) -> Result<Value, ErrorObjectOwned> {
        let req: InvokeRequest = serde_json::from_value(unwrap_positional(params))
            .map_err(|e| {
                to_rpc_error(CommandError::new(ErrorCode::InvalidArguments, e.to_string()))
            })?;
        self.call(&req.method, req.arguments).await
    }
}
