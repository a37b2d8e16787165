//! Core domain errors.

use thiserror::Error;

use crate::status::TaskStatus;

/// Core domain errors for Chainpilot.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Status or cancel requested for an id never issued by the dispatcher.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Cancel requested for a record that is no longer pending.
    #[error("Cannot cancel task {task_id} in {status:?} status")]
    NotCancellable { task_id: String, status: TaskStatus },

    /// A task is missing a field its kind requires.
    #[error("Field '{field}' is required for {kind} tasks")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    /// Task kind outside the closed routing set.
    #[error("Unsupported task kind: {0}")]
    UnsupportedKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = CoreError::MissingField {
            kind: "contract_interaction",
            field: "method",
        };
        let msg = err.to_string();
        assert!(msg.contains("method"));
        assert!(msg.contains("contract_interaction"));
    }

    #[test]
    fn test_unsupported_kind_names_the_kind() {
        let err = CoreError::UnsupportedKind("teleport".to_string());
        assert!(err.to_string().contains("teleport"));
    }
}
