//! Task records as read back from the store.
//!
//! Rows are converted field by field; the column order each constructor reads
//! is fixed by the `*_COLUMNS` constants used in the queries.

use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::Serialize;

use crate::db::{opt_timestamp_column, status_column, timestamp_column};
use crate::fields::Status;

/// Column list matching [`Task::from_row`].
pub const TASK_COLUMNS: &str = "id, title, description, status, resource, project, period_id, \
     created_datetime, todo_datetime, inwork_datetime, completed_datetime";

/// A unit of work moving across the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub resource: Option<String>,
    pub project: String,
    pub period_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub todo_at: Option<NaiveDateTime>,
    pub inwork_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status: status_column(row, 3)?,
            resource: row.get(4)?,
            project: row.get(5)?,
            period_id: row.get(6)?,
            created_at: timestamp_column(row, 7)?,
            todo_at: opt_timestamp_column(row, 8)?,
            inwork_at: opt_timestamp_column(row, 9)?,
            completed_at: opt_timestamp_column(row, 10)?,
        })
    }

    /// Resource label for display, `-` when nobody is assigned.
    pub fn resource_label(&self) -> &str {
        match self.resource.as_deref() {
            Some(r) if !r.trim().is_empty() => r,
            _ => "-",
        }
    }
}

/// Column list matching [`TaskHistory::from_row`]; expects `tasks t` joined
/// with `performance_periods p`.
pub const HISTORY_COLUMNS: &str = "t.id, t.title, t.status, t.resource, t.project, \
     t.created_datetime, t.todo_datetime, t.inwork_datetime, t.completed_datetime, p.name";

/// One line of task history with the owning period's name resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHistory {
    pub id: i64,
    pub title: String,
    pub status: Status,
    pub resource: Option<String>,
    pub project: String,
    pub created_at: NaiveDateTime,
    pub todo_at: Option<NaiveDateTime>,
    pub inwork_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub period_name: Option<String>,
}

impl TaskHistory {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TaskHistory {
            id: row.get(0)?,
            title: row.get(1)?,
            status: status_column(row, 2)?,
            resource: row.get(3)?,
            project: row.get(4)?,
            created_at: timestamp_column(row, 5)?,
            todo_at: opt_timestamp_column(row, 6)?,
            inwork_at: opt_timestamp_column(row, 7)?,
            completed_at: opt_timestamp_column(row, 8)?,
            period_name: row.get(9)?,
        })
    }
}
