//! Named date ranges (sprints) that tasks are scheduled into.

use chrono::NaiveDate;
use rusqlite::Row;
use serde::Serialize;

use crate::db::{date_column, format_input_date};

/// Column list matching [`Period::from_row`].
pub const PERIOD_COLUMNS: &str = "id, name, start_date, end_date";

/// A performance period. `start_date <= end_date` always holds for periods
/// created through [`crate::periods::PeriodManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Period {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Period {
            id: row.get(0)?,
            name: row.get(1)?,
            start_date: date_column(row, 2)?,
            end_date: date_column(row, 3)?,
        })
    }

    /// Whether `day` falls inside the period, both ends inclusive.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// `Name (MM/DD/YY - MM/DD/YY)`.
    pub fn label(&self) -> String {
        format!(
            "{} ({} - {})",
            self.name,
            format_input_date(self.start_date),
            format_input_date(self.end_date)
        )
    }

    /// Length in days, counting both ends.
    pub fn length_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprint() -> Period {
        Period {
            id: 1,
            name: "Sprint 1".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
        }
    }

    #[test]
    fn test_contains_is_inclusive() {
        let p = sprint();
        assert!(p.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(p.contains(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }

    #[test]
    fn test_label() {
        assert_eq!(sprint().label(), "Sprint 1 (01/01/24 - 01/14/24)");
    }

    #[test]
    fn test_length_days() {
        assert_eq!(sprint().length_days(), 14);
    }
}
