//! Chainpilot Agent
//!
//! The system's public surface: a task-execution façade that validates its
//! configuration, asks a reasoning call to analyze each submitted task, and
//! dispatches execution to the chain client while tracking task records in
//! memory.
//!
//! # Example
//!
//! ```rust,no_run
//! use chainpilot_agent::{Agent, AgentConfig};
//! use chainpilot_core::Task;
//! use serde_json::json;
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::new("sk-...", "https://rpc.example.org");
//!     let agent = Agent::new(config)?;
//!     agent.initialize().await?;
//!
//!     let task = Task::new("contract_interaction")
//!         .with_contract("0x00000000219ab540356cBB839Cbe05303d7705Fa")
//!         .with_method("transfer")
//!         .with_params(vec![json!("0xDEF"), json!(100)]);
//!
//!     let record = agent.execute_task(task).await?;
//!     println!("task {} finished: {:?}", record.task_id, record.status);
//!     Ok(())
//! }
//! ```

mod agent;
mod config;
mod dispatcher;
mod error;

// Re-export main types
pub use agent::Agent;
pub use config::{AgentConfig, ConfigError};
pub use dispatcher::Dispatcher;
pub use error::AgentError;
