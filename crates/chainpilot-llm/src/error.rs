//! Error types for the reasoning call.

use thiserror::Error;

/// Errors that can occur while obtaining an analysis plan.
///
/// These always propagate to the orchestrator's caller: a task whose
/// analysis fails is never submitted to the dispatcher, so no record is
/// created for it.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// HTTP-level failure reaching the completions endpoint.
    #[error("Analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("Analysis endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Completion carried no choices or no message content.
    #[error("Analysis returned an empty response")]
    EmptyResponse,

    /// Completion content was not parseable as a structured plan.
    #[error("Analysis returned unparseable content: {0}")]
    Unparseable(#[from] serde_json::Error),
}
