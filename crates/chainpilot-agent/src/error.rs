//! Agent-level errors.

use thiserror::Error;

use chainpilot_chain::ChainError;
use chainpilot_core::CoreError;
use chainpilot_llm::AnalysisError;

use crate::config::ConfigError;

/// Errors surfaced by the agent's public operations.
///
/// Task-handler faults never appear here: the dispatcher converts them into
/// failed records. What does propagate is startup failure (config, chain
/// connection), reasoning-call failure, and caller-input errors on
/// status/cancel.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Malformed configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reasoning call failed or returned unparseable content.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Chain client failure during initialize.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Unknown task id or invalid cancel target.
    #[error(transparent)]
    Task(#[from] CoreError),
}
