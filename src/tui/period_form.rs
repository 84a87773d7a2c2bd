//! Create period dialog state.

use chrono::{Duration, NaiveDate};

use crate::db::format_input_date;
use crate::tui::input::InputField;

pub const NAME_FIELD: usize = 0;
pub const START_FIELD: usize = 1;
pub const END_FIELD: usize = 2;
pub const PERIOD_FIELD_COUNT: usize = 3;

pub struct PeriodForm {
    pub name: InputField,
    pub start: InputField,
    pub end: InputField,
    pub current_field: usize,
}

impl PeriodForm {
    /// A blank name with dates pre-filled: `today` through the last day of a
    /// `span_days` long period, both as `MM/DD/YY`.
    /// A span running past the last representable date ends on `today`.
    pub fn with_defaults(today: NaiveDate, span_days: u32) -> Self {
        let last = today
            .checked_add_signed(Duration::days(i64::from(span_days.max(1)) - 1))
            .unwrap_or(today);
        Self {
            name: InputField::new(),
            start: InputField::with_value(&format_input_date(today)),
            end: InputField::with_value(&format_input_date(last)),
            current_field: NAME_FIELD,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % PERIOD_FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + PERIOD_FIELD_COUNT - 1) % PERIOD_FIELD_COUNT;
    }

    pub fn active_mut(&mut self) -> &mut InputField {
        match self.current_field {
            START_FIELD => &mut self.start,
            END_FIELD => &mut self.end,
            _ => &mut self.name,
        }
    }
}
