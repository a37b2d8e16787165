//! Chainpilot Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/RPC
//! - LLM providers
//! - Runtime specifics
//!
//! All types here represent the core business domain of Chainpilot: tasks,
//! their routing kinds, their execution records, and the analysis plan a
//! reasoning call produces for them.

pub mod error;
pub mod ids;
pub mod plan;
pub mod record;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::TaskId;
pub use plan::AnalysisPlan;
pub use record::TaskRecord;
pub use status::TaskStatus;
pub use task::{Task, TaskKind, KIND_CONTRACT_INTERACTION, KIND_MONITORING, KIND_PAYMENT};
