//! Chain client trait and the Ethereum JSON-RPC implementation.

use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::contract::ContractHandle;
use crate::error::ChainError;
use crate::rpc::JsonRpcClient;
use crate::units::{format_ether, format_gwei};

/// A mined transaction receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Hash of the transaction this receipt belongs to.
    pub transaction_hash: String,

    /// Block the transaction was mined in (hex quantity).
    #[serde(default)]
    pub block_number: Option<String>,

    /// Post-Byzantium execution status: "0x1" success, "0x0" reverted.
    #[serde(default)]
    pub status: Option<String>,

    /// Gas consumed by the transaction (hex quantity).
    #[serde(default)]
    pub gas_used: Option<String>,
}

impl TxReceipt {
    /// Whether the node reports the transaction as executed successfully.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() != Some("0x0")
    }
}

/// Read/write access to a blockchain network.
///
/// This is the seam between the task dispatcher and the network: production
/// code uses [`EthereumClient`], tests substitute a mock.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Open the RPC connection and confirm reachability.
    ///
    /// Every other method fails with [`ChainError::NotInitialized`] until
    /// this has completed successfully.
    async fn initialize(&self) -> Result<(), ChainError>;

    /// Build a contract handle from an address and a JSON ABI.
    ///
    /// Pure construction, no network call.
    fn contract(&self, address: &str, abi: &Value) -> Result<ContractHandle, ChainError>;

    /// Account balance as a decimal ether string.
    async fn balance(&self, address: &str) -> Result<String, ChainError>;

    /// Current gas price as a decimal gwei string; "0" when the node
    /// reports no fee data.
    async fn gas_price(&self) -> Result<String, ChainError>;

    /// Receipt for a transaction, or `None` if not yet mined.
    async fn transaction_receipt(&self, hash: &str) -> Result<Option<TxReceipt>, ChainError>;

    /// Block until the transaction is mined or the configured timeout
    /// elapses.
    async fn wait_for_transaction(&self, hash: &str) -> Result<TxReceipt, ChainError>;

    /// Invoke a contract method and return the transaction hash.
    async fn send_contract_call(
        &self,
        contract: &ContractHandle,
        method: &str,
        params: &[Value],
    ) -> Result<String, ChainError>;
}

/// JSON-RPC chain client for EVM networks.
///
/// The RPC connection is opened by [`initialize`](ChainClient::initialize),
/// which also probes the node's chain id as a reachability check. Submitted
/// transactions are signed by the node (`eth_sendTransaction`), so the
/// endpoint must manage its own accounts.
pub struct EthereumClient {
    endpoint: String,
    timeout: Duration,
    retries: u32,
    poll_interval: Duration,
    connection: RwLock<Option<Arc<Connection>>>,
}

struct Connection {
    rpc: JsonRpcClient,
    chain_id: u64,
}

impl EthereumClient {
    /// Create a client for the given endpoint with default settings
    /// (30s timeout, 3 retries, 2s receipt poll interval).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_millis(30_000),
            retries: 3,
            poll_interval: Duration::from_secs(2),
            connection: RwLock::new(None),
        }
    }

    /// Set the per-request timeout, also used as the confirmation deadline.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Set the retry budget for transport-level RPC faults.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the interval between receipt polls while waiting for a
    /// confirmation.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Chain id reported by the node, if initialized.
    pub fn chain_id(&self) -> Option<u64> {
        self.connection().ok().map(|connection| connection.chain_id)
    }

    /// Clone out the live connection; the lock is never held across awaits.
    fn connection(&self) -> Result<Arc<Connection>, ChainError> {
        self.connection
            .read()
            .map_err(|_| ChainError::NotInitialized)?
            .clone()
            .ok_or(ChainError::NotInitialized)
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let connection = self.connection()?;
        debug!(method, "chain call");
        connection.rpc.call(method, params).await
    }
}

#[async_trait]
impl ChainClient for EthereumClient {
    async fn initialize(&self) -> Result<(), ChainError> {
        info!(endpoint = %self.endpoint, "initializing chain connection");
        let rpc = JsonRpcClient::new(self.endpoint.clone(), self.timeout, self.retries)?;

        let result = rpc
            .call("eth_chainId", json!([]))
            .await
            .map_err(|err| ChainError::Connection(err.to_string()))?;
        let chain_id = result
            .as_str()
            .and_then(|text| u64::from_str_radix(text.trim_start_matches("0x"), 16).ok())
            .ok_or_else(|| {
                ChainError::Connection("endpoint returned no network identity".to_string())
            })?;

        info!(chain_id, "chain connection established");
        let mut guard = self
            .connection
            .write()
            .map_err(|_| ChainError::Connection("connection lock poisoned".to_string()))?;
        *guard = Some(Arc::new(Connection { rpc, chain_id }));
        Ok(())
    }

    fn contract(&self, address: &str, abi: &Value) -> Result<ContractHandle, ChainError> {
        self.connection()?;
        ContractHandle::new(address, abi)
    }

    async fn balance(&self, address: &str) -> Result<String, ChainError> {
        let result = self
            .rpc_call("eth_getBalance", json!([address, "latest"]))
            .await?;
        let wei = parse_quantity(&result)?;
        Ok(format_ether(wei))
    }

    async fn gas_price(&self) -> Result<String, ChainError> {
        let result = self.rpc_call("eth_gasPrice", json!([])).await?;
        if result.is_null() {
            // No fee data is not an error; report zero.
            return Ok("0.0".to_string());
        }
        let wei = parse_quantity(&result)?;
        Ok(format_gwei(wei))
    }

    async fn transaction_receipt(&self, hash: &str) -> Result<Option<TxReceipt>, ChainError> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if result.is_null() {
            // Not yet mined.
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|err| ChainError::MalformedResponse(err.to_string()))
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<TxReceipt, ChainError> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                if !receipt.is_success() {
                    return Err(ChainError::Transaction(format!(
                        "transaction {hash} reverted"
                    )));
                }
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ChainError::Transaction(format!(
                    "timed out waiting for transaction {hash}"
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn send_contract_call(
        &self,
        contract: &ContractHandle,
        method: &str,
        params: &[Value],
    ) -> Result<String, ChainError> {
        let calldata = contract.encode_call(method, params)?;
        let transaction = json!({
            "to": format!("{}", contract.address()),
            "data": format!("0x{}", hex::encode(calldata)),
        });
        let result = self
            .rpc_call("eth_sendTransaction", json!([transaction]))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ChainError::MalformedResponse("eth_sendTransaction returned no hash".to_string())
            })
    }
}

fn parse_quantity(value: &Value) -> Result<U256, ChainError> {
    let text = value
        .as_str()
        .ok_or_else(|| ChainError::MalformedResponse(format!("expected hex quantity, got {value}")))?;
    U256::from_str(text)
        .or_else(|_| U256::from_str_radix(text.trim_start_matches("0x"), 16))
        .map_err(|_| ChainError::MalformedResponse(format!("invalid hex quantity: {text}")))
}
