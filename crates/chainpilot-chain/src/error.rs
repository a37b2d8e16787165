//! Error types for the chain client.

use thiserror::Error;

/// Errors that can occur during chain client operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Endpoint unreachable or returned no network identity. Fatal to startup.
    #[error("Failed to connect to chain endpoint: {0}")]
    Connection(String),

    /// A chain call was attempted before `initialize()` completed successfully.
    #[error("Chain client not initialized")]
    NotInitialized,

    /// HTTP-level failure talking to the RPC endpoint.
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node returned a result the client could not decode.
    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),

    /// On-chain call failed or confirmation timed out.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Address is not 0x-prefixed 20-byte hex.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Contract interface description could not be parsed.
    #[error("Invalid contract ABI: {0}")]
    InvalidAbi(String),

    /// Method name not present in the contract's interface.
    #[error("Method '{0}' not found in contract ABI")]
    UnknownMethod(String),

    /// A method argument could not be encoded for its declared type.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
