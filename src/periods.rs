//! Period creation and lookup.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info, warn};

use crate::db::{Database, Logged, DATE_FORMAT};
use crate::error::{KanbanError, Result};
use crate::period::{Period, PERIOD_COLUMNS};

/// Period operations over an open [`Database`].
pub struct PeriodManager<'a> {
    db: &'a Database,
}

impl<'a> PeriodManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        PeriodManager { db }
    }

    /// Create a period from a name and two `MM/DD/YY` dates, returning its id.
    ///
    /// Dates are stored as ISO `YYYY-MM-DD`; the name is stored trimmed.
    pub fn create_period(&self, name: &str, start: &str, end: &str) -> Result<i64> {
        let conn = self.db.conn()?;
        let (name, start_date, end_date) = match self.db.validate_period_data(name, start, end) {
            Ok(valid) => valid,
            Err(e) => {
                if e.is_validation() {
                    warn!(error = %e, "period rejected");
                }
                return Err(e);
            }
        };

        conn.execute(
            "INSERT INTO performance_periods (name, start_date, end_date) VALUES (?1, ?2, ?3)",
            params![
                name,
                start_date.format(DATE_FORMAT).to_string(),
                end_date.format(DATE_FORMAT).to_string()
            ],
        )
        .logged("create period")?;
        let id = conn.last_insert_rowid();
        info!(period_id = id, name = %name, %start_date, %end_date, "period created");
        Ok(id)
    }

    /// All periods, earliest start first.
    pub fn get_all_periods(&self) -> Result<Vec<Period>> {
        let conn = self.db.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PERIOD_COLUMNS} FROM performance_periods ORDER BY start_date, id"
            ))
            .logged("get periods")?;
        let periods = stmt
            .query_map([], Period::from_row)
            .logged("get periods")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .logged("get periods")?;
        debug!(count = periods.len(), "loaded periods");
        Ok(periods)
    }

    /// The period with exactly this name, if any.
    pub fn get_period_by_name(&self, name: &str) -> Result<Option<Period>> {
        self.db
            .conn()?
            .query_row(
                &format!("SELECT {PERIOD_COLUMNS} FROM performance_periods WHERE name = ?1"),
                params![name],
                Period::from_row,
            )
            .optional()
            .logged("get period by name")
    }

    /// The period with this id.
    pub fn get_period(&self, period_id: i64) -> Result<Period> {
        self.db
            .conn()?
            .query_row(
                &format!("SELECT {PERIOD_COLUMNS} FROM performance_periods WHERE id = ?1"),
                params![period_id],
                Period::from_row,
            )
            .optional()
            .logged("get period")?
            .ok_or_else(|| KanbanError::period_not_found(period_id))
    }

    /// Resolve a period by name, failing with `NotFound` when it does not exist.
    pub fn require_period(&self, name: &str) -> Result<Period> {
        self.get_period_by_name(name)?
            .ok_or_else(|| KanbanError::period_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn open_db() -> Database {
        let mut db = Database::new();
        db.connect_in_memory().unwrap();
        db.create_schema().unwrap();
        db
    }

    fn stored_row(db: &Database, id: i64) -> (String, String, String) {
        db.conn()
            .unwrap()
            .query_row(
                "SELECT name, start_date, end_date FROM performance_periods WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap()
    }

    #[test]
    fn test_create_valid_period() {
        let db = open_db();
        let id = PeriodManager::new(&db).create_period("Test Period", "1/1/24", "12/31/24").unwrap();
        let (name, start, end) = stored_row(&db, id);
        assert_eq!(name, "Test Period");
        assert_eq!(start, "2024-01-01");
        assert_eq!(end, "2024-12-31");
    }

    #[test]
    fn test_create_period_strips_whitespace() {
        let db = open_db();
        let id = PeriodManager::new(&db).create_period("  Test Period  ", "1/1/24", "12/31/24").unwrap();
        assert_eq!(stored_row(&db, id).0, "Test Period");
    }

    #[test]
    fn test_create_period_with_empty_name() {
        let db = open_db();
        let periods = PeriodManager::new(&db);
        for name in ["", "   "] {
            let err = periods.create_period(name, "1/1/24", "12/31/24").unwrap_err();
            assert!(err.to_string().contains("Period name cannot be empty"));
        }
    }

    #[test]
    fn test_create_period_with_invalid_dates() {
        let db = open_db();
        let periods = PeriodManager::new(&db);
        let err = periods.create_period("Test Period", "invalid-date", "12/31/24").unwrap_err();
        assert!(err.to_string().contains("Invalid date format"));
        let err = periods.create_period("Test Period", "1/1/24", "2024-12-31").unwrap_err();
        assert!(matches!(err, KanbanError::InvalidDate { .. }));
    }

    #[test]
    fn test_create_period_with_end_before_start() {
        let db = open_db();
        let err = PeriodManager::new(&db).create_period("Test Period", "12/31/24", "1/1/24").unwrap_err();
        assert!(err.to_string().contains("End date cannot be before start date"));
    }

    #[test]
    fn test_create_single_day_period() {
        let db = open_db();
        assert!(PeriodManager::new(&db).create_period("Launch", "3/3/25", "3/3/25").is_ok());
    }

    #[test]
    fn test_create_duplicate_period() {
        let db = open_db();
        let periods = PeriodManager::new(&db);
        periods.create_period("Test Period", "1/1/24", "6/30/24").unwrap();
        let err = periods.create_period("Test Period", "7/1/24", "12/31/24").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let err = periods.create_period(" Test Period ", "7/1/24", "12/31/24").unwrap_err();
        assert!(matches!(err, KanbanError::DuplicatePeriod { .. }));
    }

    #[test]
    fn test_duplicate_check_is_case_sensitive() {
        let db = open_db();
        let periods = PeriodManager::new(&db);
        periods.create_period("Sprint", "1/1/24", "1/14/24").unwrap();
        assert!(periods.create_period("sprint", "1/15/24", "1/28/24").is_ok());
    }

    #[test]
    fn test_create_period_without_connection() {
        let db = Database::new();
        let err = PeriodManager::new(&db).create_period("Test Period", "1/1/24", "12/31/24").unwrap_err();
        assert!(matches!(err, KanbanError::NoConnection));
    }

    #[test]
    fn test_get_all_periods_sorted_by_start() {
        let db = open_db();
        let periods = PeriodManager::new(&db);
        periods.create_period("Late", "6/1/24", "6/14/24").unwrap();
        periods.create_period("Early", "1/1/24", "1/14/24").unwrap();
        periods.create_period("Middle", "3/1/24", "3/14/24").unwrap();
        let names: Vec<String> = periods.get_all_periods().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Early", "Middle", "Late"]);
    }

    #[test]
    fn test_get_period_by_name() {
        let db = open_db();
        let periods = PeriodManager::new(&db);
        let id = periods.create_period("Q1", "1/1/24", "3/31/24").unwrap();
        let q1 = periods.get_period_by_name("Q1").unwrap().unwrap();
        assert_eq!(q1.id, id);
        assert_eq!(q1.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(q1.end_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert!(periods.get_period_by_name("Q2").unwrap().is_none());
        assert_eq!(periods.get_period(id).unwrap(), q1);
        assert!(matches!(periods.get_period(id + 1), Err(KanbanError::NotFound { .. })));
        assert!(matches!(periods.require_period("Q2"), Err(KanbanError::NotFound { .. })));
    }
}
