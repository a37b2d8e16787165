//! Chain client for Chainpilot
//!
//! This crate wraps a JSON-RPC connection to an EVM network and exposes the
//! read/write operations the task dispatcher needs: balance and gas price
//! queries, contract handles with calldata encoding, receipt lookups, and
//! wait-for-confirmation polling.
//!
//! # Example
//!
//! ```rust,no_run
//! use chainpilot_chain::{ChainClient, EthereumClient};
//!
//! async fn check_balance() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EthereumClient::new("https://rpc.example.org")
//!         .with_timeout_ms(30_000)
//!         .with_retries(3);
//!
//!     client.initialize().await?;
//!     let eth = client.balance("0x00000000219ab540356cBB839Cbe05303d7705Fa").await?;
//!     println!("balance: {eth} ETH");
//!     Ok(())
//! }
//! ```

mod client;
mod contract;
mod error;
mod rpc;
mod units;

// Re-export main types
pub use client::{ChainClient, EthereumClient, TxReceipt};
pub use contract::{AbiFunction, ContractHandle};
pub use error::ChainError;
pub use rpc::JsonRpcClient;
pub use units::{format_ether, format_gwei, format_units};
