//! Reasoning-call SDK for Chainpilot
//!
//! This crate turns a [`Task`](chainpilot_core::Task) into an
//! [`AnalysisPlan`](chainpilot_core::AnalysisPlan) by asking an
//! OpenAI-compatible chat completions endpoint to analyze it. The
//! [`Analyst`] trait is the seam the orchestrator depends on; tests
//! substitute a mock.
//!
//! # Example
//!
//! ```rust,no_run
//! use chainpilot_core::Task;
//! use chainpilot_llm::{Analyst, OpenAiAnalyst};
//!
//! async fn analyze() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyst = OpenAiAnalyst::new("sk-...");
//!     let task = Task::new("monitoring");
//!     let plan = analyst.analyze(&task).await?;
//!     println!("steps: {:?}", plan.steps);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod prompt;
mod types;

// Re-export main types
pub use client::{Analyst, OpenAiAnalyst};
pub use error::AnalysisError;
pub use prompt::{build_task_prompt, SYSTEM_PROMPT};
