//! Analysis plans produced by the reasoning call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured guidance returned by the reasoning call for one task.
///
/// Consumed once at submission and never persisted. Only
/// `contract_abi` is load-bearing: the contract-interaction handler
/// needs it to construct a contract handle. The rest is advisory
/// output retained for the caller's benefit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPlan {
    /// Contract interface description (JSON ABI array).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_abi: Option<Value>,

    /// Suggested execution steps.
    #[serde(default)]
    pub steps: Vec<String>,

    /// Identified risks and mitigations.
    #[serde(default)]
    pub risks: Vec<String>,

    /// Expected outcomes.
    #[serde(default)]
    pub expected_outcomes: Vec<String>,
}

impl AnalysisPlan {
    /// Plan with only an ABI, as the contract-interaction handler needs.
    pub fn with_abi(abi: Value) -> Self {
        Self {
            contract_abi: Some(abi),
            ..Self::default()
        }
    }
}
