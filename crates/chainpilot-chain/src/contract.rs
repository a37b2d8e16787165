//! Contract handles: ABI parsing and calldata encoding.
//!
//! A [`ContractHandle`] is a typed reference to an on-chain program. It is
//! built purely from an address and a JSON ABI - no network call - and knows
//! how to encode a method invocation into calldata.

use std::str::FromStr;

use alloy_primitives::{keccak256, Address, U256};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ChainError;

#[derive(Debug, Deserialize)]
struct RawAbiEntry {
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawAbiParam>,
}

#[derive(Debug, Deserialize)]
struct RawAbiParam {
    #[serde(rename = "type")]
    kind: String,
}

/// A callable function extracted from a contract ABI.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiFunction {
    /// Function name.
    pub name: String,
    /// Canonical input types, in declaration order.
    pub inputs: Vec<String>,
}

impl AbiFunction {
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.inputs.join(","))
    }

    /// Four-byte selector of the canonical signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }
}

/// A typed reference to an on-chain contract.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    address: Address,
    functions: Vec<AbiFunction>,
}

impl ContractHandle {
    /// Build a handle from an address string and a JSON ABI array.
    ///
    /// Pure construction: fails only on malformed input, never touches the
    /// network.
    pub fn new(address: &str, abi: &Value) -> Result<Self, ChainError> {
        let address = Address::from_str(address)
            .map_err(|_| ChainError::InvalidAddress(address.to_string()))?;

        let entries: Vec<RawAbiEntry> = serde_json::from_value(abi.clone())
            .map_err(|err| ChainError::InvalidAbi(err.to_string()))?;

        let mut functions = Vec::new();
        for entry in entries {
            if entry.entry_type != "function" {
                continue;
            }
            let name = entry
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    ChainError::InvalidAbi("function entry without a name".to_string())
                })?
                .to_string();
            let inputs = entry.inputs.into_iter().map(|param| param.kind).collect();
            functions.push(AbiFunction { name, inputs });
        }

        Ok(Self { address, functions })
    }

    /// The contract's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Result<&AbiFunction, ChainError> {
        self.functions
            .iter()
            .find(|function| function.name == name)
            .ok_or_else(|| ChainError::UnknownMethod(name.to_string()))
    }

    /// Encode a method invocation into calldata (selector + ABI-encoded args).
    pub fn encode_call(&self, method: &str, params: &[Value]) -> Result<Vec<u8>, ChainError> {
        let function = self.function(method)?;
        if function.inputs.len() != params.len() {
            return Err(ChainError::InvalidArgument(format!(
                "method '{}' expects {} arguments, got {}",
                method,
                function.inputs.len(),
                params.len()
            )));
        }

        let mut head: Vec<[u8; 32]> = Vec::with_capacity(params.len());
        let mut tail: Vec<u8> = Vec::new();
        let head_len = params.len() * 32;

        for (kind, value) in function.inputs.iter().zip(params) {
            match classify(kind) {
                SolType::Static => head.push(encode_static(kind, value)?),
                SolType::Dynamic => {
                    // Head slot holds the byte offset of the tail data.
                    head.push(word_from_u256(U256::from(head_len + tail.len())));
                    tail.extend(encode_dynamic(kind, value)?);
                }
            }
        }

        let mut calldata = Vec::with_capacity(4 + head_len + tail.len());
        calldata.extend_from_slice(&function.selector());
        for word in head {
            calldata.extend_from_slice(&word);
        }
        calldata.extend_from_slice(&tail);
        Ok(calldata)
    }
}

enum SolType {
    Static,
    Dynamic,
}

fn classify(kind: &str) -> SolType {
    match kind {
        "string" | "bytes" => SolType::Dynamic,
        _ => SolType::Static,
    }
}

fn word_from_u256(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

fn encode_static(kind: &str, value: &Value) -> Result<[u8; 32], ChainError> {
    if kind == "address" {
        let text = value.as_str().ok_or_else(|| {
            ChainError::InvalidArgument(format!("expected address string, got {value}"))
        })?;
        let address = Address::from_str(text)
            .map_err(|_| ChainError::InvalidAddress(text.to_string()))?;
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_slice());
        return Ok(word);
    }

    if kind == "bool" {
        let flag = value.as_bool().ok_or_else(|| {
            ChainError::InvalidArgument(format!("expected bool, got {value}"))
        })?;
        return Ok(word_from_u256(U256::from(flag as u8)));
    }

    if kind.starts_with("uint") || kind.starts_with("int") {
        return Ok(word_from_u256(parse_uint(value)?));
    }

    if let Some(size) = kind.strip_prefix("bytes").and_then(|s| s.parse::<usize>().ok()) {
        if size == 0 || size > 32 {
            return Err(ChainError::InvalidArgument(format!(
                "unsupported fixed bytes size: {kind}"
            )));
        }
        let bytes = parse_hex_bytes(value)?;
        if bytes.len() != size {
            return Err(ChainError::InvalidArgument(format!(
                "expected {size} bytes for {kind}, got {}",
                bytes.len()
            )));
        }
        let mut word = [0u8; 32];
        word[..size].copy_from_slice(&bytes);
        return Ok(word);
    }

    Err(ChainError::InvalidArgument(format!(
        "unsupported parameter type: {kind}"
    )))
}

fn encode_dynamic(kind: &str, value: &Value) -> Result<Vec<u8>, ChainError> {
    let bytes = match kind {
        "string" => value
            .as_str()
            .ok_or_else(|| {
                ChainError::InvalidArgument(format!("expected string, got {value}"))
            })?
            .as_bytes()
            .to_vec(),
        "bytes" => parse_hex_bytes(value)?,
        other => {
            return Err(ChainError::InvalidArgument(format!(
                "unsupported parameter type: {other}"
            )))
        }
    };

    let mut out = Vec::with_capacity(32 + bytes.len().div_ceil(32) * 32);
    out.extend_from_slice(&word_from_u256(U256::from(bytes.len())));
    out.extend_from_slice(&bytes);
    // Right-pad the data to a 32-byte boundary.
    let padding = (32 - bytes.len() % 32) % 32;
    out.extend(std::iter::repeat(0u8).take(padding));
    Ok(out)
}

fn parse_uint(value: &Value) -> Result<U256, ChainError> {
    match value {
        Value::Number(number) => {
            let as_u64 = number.as_u64().ok_or_else(|| {
                ChainError::InvalidArgument(format!(
                    "numeric argument must be a non-negative integer, got {number}"
                ))
            })?;
            Ok(U256::from(as_u64))
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if let Some(hex_digits) = trimmed.strip_prefix("0x") {
                U256::from_str_radix(hex_digits, 16)
            } else {
                U256::from_str_radix(trimmed, 10)
            }
            .map_err(|_| ChainError::InvalidArgument(format!("invalid integer: {text}")))
        }
        other => Err(ChainError::InvalidArgument(format!(
            "expected integer argument, got {other}"
        ))),
    }
}

fn parse_hex_bytes(value: &Value) -> Result<Vec<u8>, ChainError> {
    let text = value.as_str().ok_or_else(|| {
        ChainError::InvalidArgument(format!("expected 0x-prefixed hex string, got {value}"))
    })?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits)
        .map_err(|err| ChainError::InvalidArgument(format!("invalid hex string: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HOLDER: &str = "0x00000000219ab540356cBB839Cbe05303d7705Fa";

    fn erc20_abi() -> Value {
        json!([
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    {"name": "to", "type": "address"},
                    {"name": "amount", "type": "uint256"}
                ],
                "outputs": [{"type": "bool"}],
                "stateMutability": "nonpayable"
            },
            {"type": "event", "name": "Transfer", "inputs": []}
        ])
    }

    #[test]
    fn test_handle_rejects_bad_address() {
        let err = ContractHandle::new("not-an-address", &erc20_abi()).unwrap_err();
        assert!(matches!(err, ChainError::InvalidAddress(_)));
    }

    #[test]
    fn test_handle_rejects_non_array_abi() {
        let err = ContractHandle::new(HOLDER, &json!({"abi": true})).unwrap_err();
        assert!(matches!(err, ChainError::InvalidAbi(_)));
    }

    #[test]
    fn test_non_function_entries_are_skipped() {
        let handle = ContractHandle::new(HOLDER, &erc20_abi()).unwrap();
        assert!(handle.function("transfer").is_ok());
        assert!(matches!(
            handle.function("Transfer"),
            Err(ChainError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_transfer_selector() {
        let handle = ContractHandle::new(HOLDER, &erc20_abi()).unwrap();
        let function = handle.function("transfer").unwrap();
        assert_eq!(function.signature(), "transfer(address,uint256)");
        assert_eq!(function.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_encode_transfer_calldata() {
        let handle = ContractHandle::new(HOLDER, &erc20_abi()).unwrap();
        let calldata = handle
            .encode_call("transfer", &[json!(HOLDER), json!(100)])
            .unwrap();

        assert_eq!(calldata.len(), 4 + 32 + 32);
        assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        // Address is left-padded into its word.
        assert_eq!(&calldata[4..16], &[0u8; 12]);
        // 100 sits in the last byte of the second word.
        assert_eq!(calldata[4 + 32 + 31], 100);
    }

    #[test]
    fn test_encode_rejects_arity_mismatch() {
        let handle = ContractHandle::new(HOLDER, &erc20_abi()).unwrap();
        let err = handle.encode_call("transfer", &[json!(HOLDER)]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidArgument(_)));
    }

    #[test]
    fn test_encode_dynamic_string() {
        let abi = json!([{
            "type": "function",
            "name": "setName",
            "inputs": [{"name": "name", "type": "string"}]
        }]);
        let handle = ContractHandle::new(HOLDER, &abi).unwrap();
        let calldata = handle.encode_call("setName", &[json!("pilot")]).unwrap();

        // selector + offset word + length word + padded data
        assert_eq!(calldata.len(), 4 + 32 + 32 + 32);
        // Offset points just past the single head slot.
        assert_eq!(calldata[4 + 31], 32);
        // Length word holds 5.
        assert_eq!(calldata[4 + 32 + 31], 5);
        assert_eq!(&calldata[4 + 64..4 + 64 + 5], b"pilot");
    }

    #[test]
    fn test_encode_uint_from_decimal_string() {
        let handle = ContractHandle::new(HOLDER, &erc20_abi()).unwrap();
        let calldata = handle
            .encode_call("transfer", &[json!(HOLDER), json!("1000000000000000000")])
            .unwrap();
        let amount = U256::from_be_slice(&calldata[4 + 32..]);
        assert_eq!(amount, U256::from(10u64).pow(U256::from(18u64)));
    }
}
