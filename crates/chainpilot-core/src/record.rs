//! Execution records owned by the task dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::TaskId;
use crate::status::TaskStatus;

/// The dispatcher's in-memory view of a task's execution outcome.
///
/// Created in `Pending` state at submission and mutated only by the
/// dispatcher. Once a record reaches a terminal status it never changes
/// again; the transition helpers are no-ops on terminal records so the
/// invariant holds even under a cancel-vs-completion race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Unique task identifier.
    pub task_id: TaskId,

    /// Current status.
    pub status: TaskStatus,

    /// Handler result payload, set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Human-readable failure message, set on failure or cancellation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the task was submitted (milliseconds since the epoch on the
    /// wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl TaskRecord {
    /// Create a new pending record for the given task id.
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Returns true if the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transition to `Success` with an optional result payload.
    ///
    /// Has no effect on a record that is already terminal.
    pub fn succeed(&mut self, result: Option<Value>) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Success;
        self.result = result;
    }

    /// Transition to `Failed` with a human-readable error message.
    ///
    /// Has no effect on a record that is already terminal.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
    }
}
