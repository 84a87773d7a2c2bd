//! Store connection, schema management and shared helpers.
//!
//! This module provides the `Database` struct that owns the single live SQLite
//! connection, creates and verifies the two-table schema, validates task and
//! period input before it is written, and hosts the column conversion and
//! display helpers used by the other modules.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use tracing::{debug, error, info, warn};

use crate::error::{KanbanError, Result};
use crate::fields::Status;
use crate::period::{Period, PERIOD_COLUMNS};
use crate::task::Task;

/// Storage format for task timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
/// Storage format for period dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Input format for period dates typed by the user.
pub const INPUT_DATE_FORMAT: &str = "%m/%d/%y";

const SCHEMA_PERIODS: &str = "CREATE TABLE IF NOT EXISTS performance_periods (
    id INTEGER PRIMARY KEY,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    name TEXT UNIQUE NOT NULL
)";

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL,
    resource TEXT,
    project TEXT NOT NULL,
    period_id INTEGER,
    created_datetime TEXT NOT NULL,
    todo_datetime TEXT,
    inwork_datetime TEXT,
    completed_datetime TEXT,
    FOREIGN KEY (period_id) REFERENCES performance_periods(id)
)";

/// Tables and the columns each must carry. Extra columns are tolerated.
pub const REQUIRED_SCHEMA: [(&str, &[&str]); 2] = [
    ("performance_periods", &["id", "start_date", "end_date", "name"]),
    (
        "tasks",
        &[
            "id",
            "title",
            "description",
            "status",
            "resource",
            "project",
            "period_id",
            "created_datetime",
            "todo_datetime",
            "inwork_datetime",
            "completed_datetime",
        ],
    ),
];

const SELECT_CURRENT_PERIOD: &str = "SELECT id, name, start_date, end_date FROM performance_periods
    WHERE date(start_date) <= date(?1) AND date(end_date) >= date(?1)
    ORDER BY id LIMIT 1";

/// Holder of the one live store connection.
///
/// Opening a store replaces whatever connection was open before. Every
/// operation on a closed holder fails with [`KanbanError::NoConnection`].
#[derive(Debug, Default)]
pub struct Database {
    conn: Option<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// A holder with no open store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or create) the store file at `path`, closing any previous one.
    pub fn connect(&mut self, path: &Path) -> Result<()> {
        self.close();
        let conn = Connection::open(path).logged("open store")?;
        self.attach(conn, path)
    }

    fn attach(&mut self, conn: Connection, path: &Path) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", true).logged("enable foreign keys")?;
        info!(path = %path.display(), "store opened");
        self.conn = Some(conn);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Open an existing store and check its schema. A missing file is not
    /// created. On a schema mismatch the connection is dropped again and the
    /// holder is left closed.
    pub fn open_verified(&mut self, path: &Path) -> Result<()> {
        self.close();
        if !path.is_file() {
            warn!(path = %path.display(), "store file does not exist");
            return Err(KanbanError::NotFound { entity: "store", key: path.display().to_string() });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).logged("open store")?;
        self.attach(conn, path)?;
        if self.verify_schema()? {
            return Ok(());
        }
        self.close();
        Err(KanbanError::InvalidSchema { path: path.display().to_string() })
    }

    /// Create (or reuse) the store at `path` and make sure both tables exist.
    pub fn create_store(&mut self, path: &Path) -> Result<()> {
        self.connect(path)?;
        self.create_schema()?;
        if self.verify_schema()? {
            return Ok(());
        }
        self.close();
        Err(KanbanError::InvalidSchema { path: path.display().to_string() })
    }

    /// Open a private in-memory store.
    pub fn connect_in_memory(&mut self) -> Result<()> {
        self.close();
        let conn = Connection::open_in_memory().logged("open in-memory store")?;
        conn.pragma_update(None, "foreign_keys", true).logged("enable foreign keys")?;
        debug!("in-memory store opened");
        self.conn = Some(conn);
        self.path = None;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Path of the open store file, `None` for in-memory or closed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The live connection.
    pub fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(KanbanError::NoConnection)
    }

    /// Create both tables if they are absent. Safe to call repeatedly.
    pub fn create_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(SCHEMA_PERIODS, []).logged("create performance_periods")?;
        conn.execute(SCHEMA_TASKS, []).logged("create tasks")?;
        info!("schema ready");
        Ok(())
    }

    /// Check that every required table exists with at least its required columns.
    pub fn verify_schema(&self) -> Result<bool> {
        let conn = self.conn()?;
        for (table, columns) in REQUIRED_SCHEMA {
            let exists = conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .logged("look up table")?
                .is_some();
            if !exists {
                warn!(table, "schema check failed: table missing");
                return Ok(false);
            }

            let mut stmt = conn
                .prepare(&format!("PRAGMA table_info({table})"))
                .logged("read table info")?;
            let existing: Vec<String> = stmt
                .query_map([], |row| row.get::<_, String>(1))
                .logged("read table info")?
                .collect::<rusqlite::Result<_>>()
                .logged("read table info")?;

            if let Some(missing) = columns.iter().find(|c| !existing.iter().any(|e| e == *c)) {
                warn!(table, column = missing, "schema check failed: column missing");
                return Ok(false);
            }
        }
        debug!("schema verified");
        Ok(true)
    }

    /// Close the store. Closing an already closed holder is a no-op.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                error!(error = %e, "error while closing store");
            }
            info!("store closed");
        }
        self.path = None;
    }

    /// The first period whose range brackets today's local date.
    pub fn current_period(&self) -> Result<Option<Period>> {
        self.current_period_on(Local::now().date_naive())
    }

    /// The first period (by row order) whose range brackets `day`.
    pub fn current_period_on(&self, day: NaiveDate) -> Result<Option<Period>> {
        let conn = self.conn()?;
        let day = day.format(DATE_FORMAT).to_string();
        conn.query_row(SELECT_CURRENT_PERIOD, params![day], Period::from_row)
            .optional()
            .logged("get current period")
    }

    /// Reject empty titles and projects (after trimming).
    pub fn validate_task_data(title: &str, project: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(KanbanError::EmptyTitle);
        }
        if project.trim().is_empty() {
            return Err(KanbanError::EmptyProject);
        }
        Ok(())
    }

    /// Validate a new period and return its trimmed name and parsed dates.
    ///
    /// Rules are checked in order: non-empty name, both dates parse as
    /// `MM/DD/YY`, end not before start, name not already used.
    pub fn validate_period_data(
        &self,
        name: &str,
        start: &str,
        end: &str,
    ) -> Result<(String, NaiveDate, NaiveDate)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KanbanError::EmptyPeriodName);
        }
        let start_date = parse_period_date(start)?;
        let end_date = parse_period_date(end)?;
        if end_date < start_date {
            return Err(KanbanError::EndBeforeStart);
        }

        let taken = self
            .conn()?
            .query_row(
                &format!("SELECT {PERIOD_COLUMNS} FROM performance_periods WHERE name = ?1"),
                params![name],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .logged("check period name")?
            .is_some();
        if taken {
            return Err(KanbanError::DuplicatePeriod { name: name.to_string() });
        }
        Ok((name.to_string(), start_date, end_date))
    }
}

/// Parse a user-entered `MM/DD/YY` date. Single-digit months and days are accepted.
pub fn parse_period_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, INPUT_DATE_FORMAT)
        .map_err(|_| KanbanError::InvalidDate { input: trimmed.to_string() })
}

/// Format a date the way the period dialog expects it back.
pub fn format_input_date(date: NaiveDate) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}

/// Format a timestamp for storage.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts ISO-8601 with `T` or a space separator,
/// with or without fractional seconds.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Current local time, truncated to microseconds so it survives a storage round trip.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    parse_timestamp(&format_timestamp(now)).unwrap_or(now)
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

/// Read a required timestamp column.
pub fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| conversion_error(idx, format!("bad timestamp '{raw}'")))
}

/// Read a nullable timestamp column.
pub fn opt_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, format!("bad timestamp '{raw}'"))),
    }
}

/// Read an ISO date column.
pub fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

/// Read a status column.
pub fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Status> {
    let raw: String = row.get(idx)?;
    raw.parse::<Status>().map_err(|e| conversion_error(idx, e))
}

/// Log a storage failure where it happens and lift it into [`KanbanError`].
pub(crate) trait Logged<T> {
    fn logged(self, op: &str) -> Result<T>;
}

impl<T> Logged<T> for rusqlite::Result<T> {
    fn logged(self, op: &str) -> Result<T> {
        self.map_err(|e| {
            error!(op, error = %e, "storage failure");
            KanbanError::Storage(e)
        })
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Format an average duration in hours.
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.2} hours")
}

/// Short timestamp for tables, `-` when absent.
pub fn format_opt_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Print tasks in a formatted table.
pub fn print_task_table(tasks: &[Task]) {
    println!(
        "{:<5} {:<12} {:<14} {:<14} {}",
        "ID", "Status", "Resource", "Project", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<12} {:<14} {:<14} {}",
            t.id,
            t.status.label(),
            truncate(t.resource_label(), 14),
            truncate(&t.project, 14),
            t.title
        );
    }
}
