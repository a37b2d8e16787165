//! Low-level JSON-RPC client with a bounded retry policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ChainError;

/// Base delay for the exponential backoff between retry attempts.
const RETRY_BASE_DELAY_MS: u64 = 250;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client over HTTP.
///
/// Transport-level faults (connect errors, timeouts, bad gateways) are
/// retried with exponential backoff up to the configured attempt count.
/// JSON-RPC error responses are node verdicts, not transient faults, and
/// are never retried.
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: String,
    retries: u32,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for the given endpoint.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            retries,
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint URL this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue a JSON-RPC call and return the raw `result` value.
    ///
    /// A `null` result is returned as `Value::Null`; callers decide whether
    /// that is meaningful (e.g. a not-yet-mined receipt) or malformed.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut attempt = 0u32;
        let response = loop {
            debug!(method, id, attempt, "RPC call");
            match self.http.post(&self.endpoint).json(&request).send().await {
                Ok(response) => break response,
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(ChainError::Transport(err));
                    }
                    let delay = RETRY_BASE_DELAY_MS << attempt;
                    warn!(method, attempt, delay_ms = delay, error = %err, "RPC transport fault, retrying");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
            }
        };

        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}
