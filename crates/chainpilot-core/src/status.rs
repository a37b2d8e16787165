//! Status enum for task execution records.

use serde::{Deserialize, Serialize};

/// Status of a task's execution record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task submitted, handler not yet finished.
    #[default]
    Pending,
    /// Handler completed successfully.
    Success,
    /// Handler failed, or the task was cancelled while pending.
    Failed,
}

impl TaskStatus {
    /// Returns true if the status is terminal.
    ///
    /// Terminal statuses are immutable: a record transitions only
    /// Pending -> Success or Pending -> Failed, never out of a
    /// terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}
