//! Task submission type and kind routing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::CoreError;

/// Kind string for contract method invocation tasks.
pub const KIND_CONTRACT_INTERACTION: &str = "contract_interaction";
/// Kind string for payment tasks (extension point).
pub const KIND_PAYMENT: &str = "payment";
/// Kind string for monitoring tasks (extension point).
pub const KIND_MONITORING: &str = "monitoring";

/// A Task is a unit of requested automation work.
///
/// Tasks are immutable once submitted: the dispatcher reads them but never
/// mutates them, and all execution state lives in the
/// [`TaskRecord`](crate::TaskRecord) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Declared kind, routed against a closed set of handlers.
    pub kind: String,

    /// Target contract address (contract interactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,

    /// Contract method name to invoke (contract interactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Ordered method arguments.
    #[serde(default)]
    pub params: Vec<Value>,

    /// Arbitrary caller-supplied metadata.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Task {
    /// Create a new Task of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            contract_address: None,
            method: None,
            params: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Builder method to set the contract address.
    pub fn with_contract(mut self, address: impl Into<String>) -> Self {
        self.contract_address = Some(address.into());
        self
    }

    /// Builder method to set the contract method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Builder method to set the ordered parameter list.
    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    /// Builder method to add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Typed routing view of a task, parsed from its loose submission shape.
///
/// Each variant carries only the fields its handler needs, so the
/// required-field checks happen once at routing time instead of inside
/// every handler.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Invoke a method on an on-chain contract and await confirmation.
    ContractInteraction {
        contract_address: String,
        method: String,
    },
    /// Extension point; succeeds without doing work.
    Payment,
    /// Extension point; succeeds without doing work.
    Monitoring,
}

impl TaskKind {
    /// Parse a submitted task into its typed kind.
    ///
    /// Fails with [`CoreError::MissingField`] when a contract interaction
    /// lacks its address or method, and [`CoreError::UnsupportedKind`] for
    /// any kind outside the closed routing set.
    pub fn parse(task: &Task) -> Result<Self, CoreError> {
        match task.kind.as_str() {
            KIND_CONTRACT_INTERACTION => {
                let contract_address = task.contract_address.clone().ok_or(
                    CoreError::MissingField {
                        kind: KIND_CONTRACT_INTERACTION,
                        field: "contractAddress",
                    },
                )?;
                let method = task.method.clone().ok_or(CoreError::MissingField {
                    kind: KIND_CONTRACT_INTERACTION,
                    field: "method",
                })?;
                Ok(Self::ContractInteraction {
                    contract_address,
                    method,
                })
            }
            KIND_PAYMENT => Ok(Self::Payment),
            KIND_MONITORING => Ok(Self::Monitoring),
            other => Err(CoreError::UnsupportedKind(other.to_string())),
        }
    }
}
