//! Task form handling for the terminal user interface.
//!
//! Holds the three inputs of the create task dialog and which of them has
//! focus. Validation is left to the task operations so the dialog shows the
//! same messages as the command line.

use crate::tui::input::InputField;

/// Field order in the create task dialog.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const PROJECT_FIELD: usize = 2;
pub const TASK_FIELD_COUNT: usize = 3;

pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub project: InputField,
    pub current_field: usize,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            title: InputField::new(),
            description: InputField::new(),
            project: InputField::new(),
            current_field: TITLE_FIELD,
        }
    }

    /// Start a new form, keeping the last project used.
    pub fn reset_keeping_project(&mut self) {
        let project = std::mem::take(&mut self.project);
        *self = Self::new();
        self.project = project;
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % TASK_FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + TASK_FIELD_COUNT - 1) % TASK_FIELD_COUNT;
    }

    /// The input that currently has focus.
    pub fn active_mut(&mut self) -> &mut InputField {
        match self.current_field {
            DESCRIPTION_FIELD => &mut self.description,
            PROJECT_FIELD => &mut self.project,
            _ => &mut self.title,
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
