//! Completion statistics and task history.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rusqlite::params;
use serde::Serialize;
use tracing::debug;

use crate::db::{opt_timestamp_column, Database, Logged};
use crate::error::Result;
use crate::fields::Status;
use crate::task::{TaskHistory, HISTORY_COLUMNS};

/// Aggregates over the completed tasks of one period, or of all periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskMetrics {
    pub total_tasks: usize,
    /// Mean hours from todo to inwork.
    pub avg_todo_to_inwork: f64,
    /// Mean hours from inwork to completed.
    pub avg_inwork_to_complete: f64,
    /// Mean hours from todo to completed.
    pub avg_total_time: f64,
    pub by_resource: BTreeMap<String, GroupMetrics>,
    pub by_project: BTreeMap<String, GroupMetrics>,
}

/// Completion count and mean todo-to-completed hours for one resource or project.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub tasks_completed: usize,
    pub avg_completion_time: f64,
}

struct CompletedRow {
    todo_at: Option<NaiveDateTime>,
    inwork_at: Option<NaiveDateTime>,
    completed_at: Option<NaiveDateTime>,
    resource: Option<String>,
    project: String,
}

impl CompletedRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(CompletedRow {
            todo_at: opt_timestamp_column(row, 0)?,
            inwork_at: opt_timestamp_column(row, 1)?,
            completed_at: opt_timestamp_column(row, 2)?,
            resource: row.get(3)?,
            project: row.get(4)?,
        })
    }
}

/// Running mean over the samples that are present.
#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, hours: Option<f64>) {
        if let Some(h) = hours {
            self.sum += h;
            self.count += 1;
        }
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Default)]
struct GroupAcc {
    count: usize,
    total: Mean,
}

fn hours_between(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Option<f64> {
    let (from, to) = (from?, to?);
    Some((to - from).num_microseconds()? as f64 / 3_600_000_000.0)
}

fn finish(groups: BTreeMap<String, GroupAcc>) -> BTreeMap<String, GroupMetrics> {
    groups
        .into_iter()
        .map(|(key, acc)| {
            let metrics = GroupMetrics {
                tasks_completed: acc.count,
                avg_completion_time: acc.total.value(),
            };
            (key, metrics)
        })
        .collect()
}

pub struct StatisticsManager<'a> {
    db: &'a Database,
}

impl<'a> StatisticsManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        StatisticsManager { db }
    }

    /// Compute completion metrics, optionally restricted to one period.
    ///
    /// An empty set of completed tasks yields an all-zero result.
    pub fn calculate_task_metrics(&self, period_id: Option<i64>) -> Result<TaskMetrics> {
        let rows = self.completed_rows(period_id)?;

        let mut todo_to_inwork = Mean::default();
        let mut inwork_to_complete = Mean::default();
        let mut total = Mean::default();
        let mut by_resource: BTreeMap<String, GroupAcc> = BTreeMap::new();
        let mut by_project: BTreeMap<String, GroupAcc> = BTreeMap::new();

        for row in &rows {
            let span = hours_between(row.todo_at, row.completed_at);
            todo_to_inwork.add(hours_between(row.todo_at, row.inwork_at));
            inwork_to_complete.add(hours_between(row.inwork_at, row.completed_at));
            total.add(span);

            if let Some(resource) = &row.resource {
                let acc = by_resource.entry(resource.clone()).or_default();
                acc.count += 1;
                acc.total.add(span);
            }
            let acc = by_project.entry(row.project.clone()).or_default();
            acc.count += 1;
            acc.total.add(span);
        }

        debug!(?period_id, completed = rows.len(), "metrics calculated");
        Ok(TaskMetrics {
            total_tasks: rows.len(),
            avg_todo_to_inwork: todo_to_inwork.value(),
            avg_inwork_to_complete: inwork_to_complete.value(),
            avg_total_time: total.value(),
            by_resource: finish(by_resource),
            by_project: finish(by_project),
        })
    }

    /// Every task with its period name, optionally restricted to one period.
    pub fn get_task_history(&self, period_id: Option<i64>) -> Result<Vec<TaskHistory>> {
        let conn = self.db.conn()?;
        let mut sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM tasks t
             LEFT JOIN performance_periods p ON t.period_id = p.id"
        );
        if period_id.is_some() {
            sql.push_str(" WHERE t.period_id = ?1");
        }
        sql.push_str(" ORDER BY t.id");

        let mut stmt = conn.prepare(&sql).logged("get task history")?;
        let rows = match period_id {
            Some(id) => stmt.query_map(params![id], TaskHistory::from_row),
            None => stmt.query_map([], TaskHistory::from_row),
        }
        .logged("get task history")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .logged("get task history")?;
        debug!(?period_id, count = rows.len(), "loaded task history");
        Ok(rows)
    }

    fn completed_rows(&self, period_id: Option<i64>) -> Result<Vec<CompletedRow>> {
        let conn = self.db.conn()?;
        let mut sql = String::from(
            "SELECT todo_datetime, inwork_datetime, completed_datetime, resource, project
             FROM tasks WHERE status = ?1",
        );
        if period_id.is_some() {
            sql.push_str(" AND period_id = ?2");
        }

        let completed = Status::Completed.as_str();
        let mut stmt = conn.prepare(&sql).logged("read completed tasks")?;
        let rows = match period_id {
            Some(id) => stmt.query_map(params![completed, id], CompletedRow::from_row),
            None => stmt.query_map(params![completed], CompletedRow::from_row),
        }
        .logged("read completed tasks")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .logged("read completed tasks")?;
        Ok(rows)
    }
}
