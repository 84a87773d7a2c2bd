//! Error type shared by every layer of the tracker.
//!
//! Validation failures, missing rows, refused transitions and storage faults are
//! all variants of [`KanbanError`], so a caller can tell "not found" apart from
//! "the write failed" without inspecting strings.

use crate::fields::Status;

/// Top-level error type for the kanban tracker.
#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    /// Task title was empty or whitespace.
    #[error("Task title cannot be empty")]
    EmptyTitle,

    /// Task project was empty or whitespace.
    #[error("Project name cannot be empty")]
    EmptyProject,

    /// Period name was empty or whitespace.
    #[error("Period name cannot be empty")]
    EmptyPeriodName,

    /// A period date did not parse as `MM/DD/YY`.
    #[error("Invalid date format '{input}', expected MM/DD/YY")]
    InvalidDate { input: String },

    #[error("End date cannot be before start date")]
    EndBeforeStart,

    #[error("Period '{name}' already exists")]
    DuplicatePeriod { name: String },

    /// No store is open.
    #[error("no store is open")]
    NoConnection,

    /// The opened file lacks the tracker's tables or columns.
    #[error("'{path}' is not a kanban store (missing tables or columns)")]
    InvalidSchema { path: String },

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// Transition refused by the strict transition policy.
    #[error("cannot move a task from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl KanbanError {
    /// True for errors caused by user input that should be shown verbatim.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle
                | Self::EmptyProject
                | Self::EmptyPeriodName
                | Self::InvalidDate { .. }
                | Self::EndBeforeStart
                | Self::DuplicatePeriod { .. }
                | Self::InvalidTransition { .. }
        )
    }

    pub(crate) fn task_not_found(id: i64) -> Self {
        Self::NotFound { entity: "task", key: id.to_string() }
    }

    pub(crate) fn period_not_found(key: impl ToString) -> Self {
        Self::NotFound { entity: "period", key: key.to_string() }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, KanbanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_distinct() {
        let messages = [
            KanbanError::EmptyTitle.to_string(),
            KanbanError::EmptyProject.to_string(),
            KanbanError::EmptyPeriodName.to_string(),
            KanbanError::InvalidDate { input: "x".into() }.to_string(),
            KanbanError::EndBeforeStart.to_string(),
            KanbanError::DuplicatePeriod { name: "Q1".into() }.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(messages[3].contains("Invalid date format"));
        assert!(messages[5].contains("already exists"));
    }

    #[test]
    fn test_is_validation() {
        assert!(KanbanError::EmptyTitle.is_validation());
        assert!(KanbanError::EndBeforeStart.is_validation());
        assert!(!KanbanError::NoConnection.is_validation());
        assert!(!KanbanError::task_not_found(3).is_validation());
        assert_eq!(KanbanError::task_not_found(3).to_string(), "task '3' not found");
    }
}
