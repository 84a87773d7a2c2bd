//! Interactive kanban board.
//!
//! The board shows one period at a time as three columns (Todo, In Progress,
//! Completed), plus an Unassigned tab for tasks not yet scheduled and a
//! Statistics tab. Each action refreshes only the views it affects; opening
//! a store refreshes everything. Until a store is open only the store
//! dialogs, help and quit are available.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::config::Config;
use crate::db::{format_hours, format_opt_timestamp, truncate, Database};
use crate::error::KanbanError;
use crate::fields::{Status, TransitionPolicy};
use crate::period::Period;
use crate::periods::PeriodManager;
use crate::stats::{GroupMetrics, StatisticsManager, TaskMetrics};
use crate::task::Task;
use crate::tasks::TaskManager;
use crate::tui::colors::{status_color, text_on, Theme, DARK_RED, GOLD, STEEL_BLUE};
use crate::tui::enums::{AppState, Tab};
use crate::tui::input::InputField;
use crate::tui::period_form::PeriodForm;
use crate::tui::task_form::TaskForm;
use crate::tui::utils::{centered_rect, wrap_words};

/// Statuses shown as board columns, left to right.
const BOARD_STATUSES: [Status; 3] = [Status::Todo, Status::InWork, Status::Completed];
/// Card height including its border.
const CARD_HEIGHT: usize = 6;

/// Scroll offset that keeps `selected` inside a window of `visible` items.
fn scroll_offset(selected: usize, offset: usize, visible: usize) -> usize {
    if visible == 0 || selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    }
}

/// Board application state
pub struct App {
    db: Database,
    policy: TransitionPolicy,
    period_span_days: u32,
    today: NaiveDate,
    theme: Theme,

    periods: Vec<Period>,
    current_period: Option<Period>,
    columns: [Vec<Task>; 3],
    unassigned: Vec<Task>,
    metrics: TaskMetrics,

    state: AppState,
    tab: Tab,
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: [usize; 3],
    selected_unassigned: usize,
    period_cursor: usize,

    path_input: InputField,
    resource_input: InputField,
    task_form: TaskForm,
    period_form: PeriodForm,
    assign_target: Option<(i64, Status)>,
    status_message: String,
}

impl App {
    /// Build the board around `db`. An open store is loaded immediately.
    pub fn new(db: Database, config: &Config) -> Self {
        Self::new_on(db, config, Local::now().date_naive())
    }

    /// Like [`App::new`] with a fixed "today".
    pub fn new_on(db: Database, config: &Config, today: NaiveDate) -> Self {
        let mut app = App {
            db,
            policy: config.transitions,
            period_span_days: config.default_period_days,
            today,
            theme: config.theme,
            periods: Vec::new(),
            current_period: None,
            columns: Default::default(),
            unassigned: Vec::new(),
            metrics: TaskMetrics::default(),
            state: AppState::Main,
            tab: Tab::Board,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; 3],
            selected_unassigned: 0,
            period_cursor: 0,
            path_input: InputField::new(),
            resource_input: InputField::new(),
            task_form: TaskForm::new(),
            period_form: PeriodForm::with_defaults(today, config.default_period_days),
            assign_target: None,
            status_message: String::new(),
        };
        if app.db.is_open() {
            app.on_store_opened();
        }
        app
    }

    /// Actions other than opening a store need an open store.
    pub fn ui_enabled(&self) -> bool {
        self.db.is_open()
    }

    fn tasks(&self) -> TaskManager<'_> {
        TaskManager::with_policy(&self.db, self.policy)
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Show a failure in the status bar. Validation messages are shown as is.
    fn report(&mut self, e: KanbanError) {
        if e.is_validation() {
            self.set_status_message(e.to_string());
        } else {
            self.set_status_message(format!("Error: {e}"));
        }
    }

    // Store lifecycle

    /// Select the period containing today, then reload every view.
    fn on_store_opened(&mut self) {
        self.current_period = match self.db.current_period_on(self.today) {
            Ok(period) => period,
            Err(e) => {
                self.report(e);
                None
            }
        };
        self.refresh_all_views();
    }

    fn clear_views(&mut self) {
        self.periods.clear();
        self.current_period = None;
        self.columns = Default::default();
        self.unassigned.clear();
        self.metrics = TaskMetrics::default();
        self.selected_card = 0;
        self.selected_unassigned = 0;
    }

    fn submit_store_path(&mut self, create: bool) {
        let raw = self.path_input.value.trim().to_string();
        if raw.is_empty() {
            self.set_status_message("Enter a file path");
            return;
        }
        let path = PathBuf::from(&raw);
        let result = if create {
            self.db.create_store(&path)
        } else {
            self.db.open_verified(&path)
        };
        match result {
            Ok(()) => {
                self.state = AppState::Main;
                self.on_store_opened();
                self.set_status_message(if create {
                    format!("New store created: {raw}")
                } else {
                    format!("Store opened: {raw}")
                });
            }
            Err(e) => {
                self.clear_views();
                self.report(e);
            }
        }
    }

    // Targeted refreshes

    pub fn update_period_selector(&mut self) {
        let result = PeriodManager::new(&self.db).get_all_periods();
        match result {
            Ok(periods) => self.periods = periods,
            Err(e) => {
                self.report(e);
                return;
            }
        }
        if self.current_period.is_none() {
            if let Some(first) = self.periods.first().cloned() {
                self.current_period = Some(first);
                self.update_kanban_board();
            }
        }
    }

    pub fn update_kanban_board(&mut self) {
        for column in self.columns.iter_mut() {
            column.clear();
        }
        self.column_scroll_offsets = [0; 3];

        if let Some(period_id) = self.current_period.as_ref().map(|p| p.id) {
            let result = self.tasks().get_tasks_by_period(period_id);
            match result {
                Ok(tasks) => {
                    for task in tasks {
                        if let Some(i) = task.status.board_column() {
                            self.columns[i].push(task);
                        }
                    }
                }
                Err(e) => self.report(e),
            }
        }
        self.clamp_selection();
    }

    pub fn update_unassigned_tasks(&mut self) {
        let result = self.tasks().get_unassigned_tasks();
        match result {
            Ok(tasks) => self.unassigned = tasks,
            Err(e) => self.report(e),
        }
        if self.selected_unassigned >= self.unassigned.len() {
            self.selected_unassigned = self.unassigned.len().saturating_sub(1);
        }
    }

    pub fn update_statistics(&mut self) {
        let period_id = self.current_period.as_ref().map(|p| p.id);
        let result = StatisticsManager::new(&self.db).calculate_task_metrics(period_id);
        match result {
            Ok(metrics) => self.metrics = metrics,
            Err(e) => self.report(e),
        }
    }

    pub fn refresh_all_views(&mut self) {
        debug!("refreshing all views");
        self.update_period_selector();
        self.update_unassigned_tasks();
        self.update_kanban_board();
        self.update_statistics();
    }

    fn change_period(&mut self, index: usize) {
        if let Some(period) = self.periods.get(index).cloned() {
            self.set_status_message(format!("Period: {}", period.label()));
            self.current_period = Some(period);
            self.update_kanban_board();
            self.update_statistics();
        }
    }

    // Task actions

    fn move_to_todo(&mut self, task_id: i64) {
        let Some(period_id) = self.current_period.as_ref().map(|p| p.id) else {
            self.set_status_message("Please select a period first.");
            return;
        };
        let result = self.tasks().move_to_todo(task_id, period_id);
        match result {
            Ok(()) => {
                self.update_unassigned_tasks();
                self.update_kanban_board();
                self.set_status_message(format!("Task #{task_id} moved to Todo"));
            }
            Err(e) => self.report(e),
        }
    }

    fn start_task(&mut self, task_id: i64) {
        let result = self.tasks().start_task(task_id);
        match result {
            Ok(()) => {
                self.update_kanban_board();
                self.set_status_message(format!("Task #{task_id} started"));
            }
            Err(e) => self.report(e),
        }
    }

    fn complete_task(&mut self, task_id: i64) {
        let result = self.tasks().complete_task(task_id);
        match result {
            Ok(()) => {
                self.update_kanban_board();
                self.update_statistics();
                self.set_status_message(format!("Task #{task_id} completed"));
            }
            Err(e) => self.report(e),
        }
    }

    fn assign_resource(&mut self) {
        let Some((task_id, status)) = self.assign_target else {
            self.state = AppState::Main;
            return;
        };
        let resource = self.resource_input.value.trim().to_string();
        let result = self.tasks().assign_resource(task_id, &resource);
        match result {
            Ok(()) => {
                self.state = AppState::Main;
                self.assign_target = None;
                // Refresh whichever view lists the task.
                match status {
                    Status::Unassigned => self.update_unassigned_tasks(),
                    Status::Todo | Status::InWork | Status::Completed => self.update_kanban_board(),
                }
                self.set_status_message(format!("Task #{task_id} assigned to {resource}"));
            }
            Err(e) => self.report(e),
        }
    }

    fn create_task(&mut self) {
        let form = &self.task_form;
        let result = self.tasks().create_task(
            &form.title.value,
            Some(form.description.value.as_str()),
            &form.project.value,
        );
        match result {
            Ok(id) => {
                self.state = AppState::Main;
                self.update_unassigned_tasks();
                self.set_status_message(format!("Task #{id} created"));
            }
            Err(e) => self.report(e),
        }
    }

    fn create_period(&mut self) {
        let form = &self.period_form;
        let result = PeriodManager::new(&self.db).create_period(
            &form.name.value,
            &form.start.value,
            &form.end.value,
        );
        match result {
            Ok(_) => {
                self.state = AppState::Main;
                self.update_period_selector();
                self.set_status_message(format!("Period '{}' created", self.period_form.name.value.trim()));
            }
            Err(e) => self.report(e),
        }
    }

    /// Primary action for the selected task, chosen by its status.
    fn act_on_selected(&mut self) {
        let Some((task_id, status)) = self.selected_task().map(|t| (t.id, t.status)) else {
            self.set_status_message("No task selected");
            return;
        };
        match status {
            Status::Unassigned => self.move_to_todo(task_id),
            Status::Todo => self.start_task(task_id),
            Status::InWork => self.complete_task(task_id),
            Status::Completed => self.set_status_message(format!("Task #{task_id} is already completed")),
        }
    }

    fn selected_task(&self) -> Option<&Task> {
        match self.tab {
            Tab::Board => self.columns[self.selected_column].get(self.selected_card),
            Tab::Unassigned => self.unassigned.get(self.selected_unassigned),
            Tab::Statistics => None,
        }
    }

    /// Ensure selected column and card indices are valid
    fn clamp_selection(&mut self) {
        if self.selected_column >= self.columns.len() {
            self.selected_column = 0;
        }
        let column_len = self.columns[self.selected_column].len();
        if column_len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    // Input

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.state {
            AppState::Main => return self.handle_main_key(key),
            AppState::Help => self.state = AppState::Main,
            AppState::TaskDetail => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('d') | KeyCode::Char('q')) {
                    self.state = AppState::Main;
                }
            }
            AppState::SelectPeriod => self.handle_select_period_key(key),
            AppState::NewStore
            | AppState::OpenStore
            | AppState::CreatePeriod
            | AppState::CreateTask
            | AppState::AssignResource => self.handle_dialog_key(key),
        }
        false
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> bool {
        self.clear_status_message();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') => {
                self.path_input.clear();
                self.state = AppState::NewStore;
            }
            KeyCode::Char('o') => {
                self.path_input = match self.db.path() {
                    Some(p) => InputField::with_value(&p.display().to_string()),
                    None => InputField::new(),
                };
                self.state = AppState::OpenStore;
            }
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char('t') => {
                self.theme = self.theme.toggle();
                self.set_status_message(format!("Theme: {}", self.theme.name()));
            }
            _ if !self.ui_enabled() => {
                self.set_status_message("No store open. Press n to create one or o to open one.");
            }
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.prev(),
            KeyCode::Char('1') => self.tab = Tab::Board,
            KeyCode::Char('2') => self.tab = Tab::Unassigned,
            KeyCode::Char('3') => self.tab = Tab::Statistics,
            KeyCode::Char('p') => {
                self.period_form = PeriodForm::with_defaults(self.today, self.period_span_days);
                self.state = AppState::CreatePeriod;
            }
            KeyCode::Char('a') => {
                self.task_form.reset_keeping_project();
                self.state = AppState::CreateTask;
            }
            KeyCode::Char('s') => {
                if self.periods.is_empty() {
                    self.set_status_message("No periods yet. Press p to create one.");
                } else {
                    let current = self.current_period.as_ref().map(|p| p.id);
                    self.period_cursor = self
                        .periods
                        .iter()
                        .position(|p| Some(p.id) == current)
                        .unwrap_or(0);
                    self.state = AppState::SelectPeriod;
                }
            }
            KeyCode::Char('r') => match self.selected_task().map(|t| (t.id, t.status, t.resource.clone())) {
                Some((id, status, resource)) => {
                    self.assign_target = Some((id, status));
                    self.resource_input = InputField::with_value(resource.as_deref().unwrap_or(""));
                    self.state = AppState::AssignResource;
                }
                None => self.set_status_message("No task selected"),
            },
            KeyCode::Char('d') => {
                if self.selected_task().is_some() {
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::F(5) => {
                self.refresh_all_views();
                self.set_status_message("Refreshed");
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.act_on_selected(),
            KeyCode::Left => {
                if self.tab == Tab::Board && self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.tab == Tab::Board && self.selected_column < self.columns.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => match self.tab {
                Tab::Board => self.selected_card = self.selected_card.saturating_sub(1),
                Tab::Unassigned => self.selected_unassigned = self.selected_unassigned.saturating_sub(1),
                Tab::Statistics => {}
            },
            KeyCode::Down => match self.tab {
                Tab::Board => {
                    if self.selected_card + 1 < self.columns[self.selected_column].len() {
                        self.selected_card += 1;
                    }
                }
                Tab::Unassigned => {
                    if self.selected_unassigned + 1 < self.unassigned.len() {
                        self.selected_unassigned += 1;
                    }
                }
                Tab::Statistics => {}
            },
            _ => {}
        }
        false
    }

    fn handle_select_period_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state = AppState::Main,
            KeyCode::Up => self.period_cursor = self.period_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.period_cursor + 1 < self.periods.len() {
                    self.period_cursor += 1;
                }
            }
            KeyCode::Enter => {
                self.state = AppState::Main;
                self.change_period(self.period_cursor);
            }
            _ => {}
        }
    }

    fn active_input(&mut self) -> &mut InputField {
        match self.state {
            AppState::CreateTask => self.task_form.active_mut(),
            AppState::CreatePeriod => self.period_form.active_mut(),
            AppState::AssignResource => &mut self.resource_input,
            _ => &mut self.path_input,
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Main;
                self.clear_status_message();
            }
            KeyCode::Enter => self.submit_dialog(),
            KeyCode::Tab | KeyCode::Down => match self.state {
                AppState::CreateTask => self.task_form.next_field(),
                AppState::CreatePeriod => self.period_form.next_field(),
                _ => {}
            },
            KeyCode::BackTab | KeyCode::Up => match self.state {
                AppState::CreateTask => self.task_form.prev_field(),
                AppState::CreatePeriod => self.period_form.prev_field(),
                _ => {}
            },
            KeyCode::Left => self.active_input().move_cursor_left(),
            KeyCode::Right => self.active_input().move_cursor_right(),
            KeyCode::Home => self.active_input().home(),
            KeyCode::End => self.active_input().end(),
            KeyCode::Backspace => self.active_input().handle_backspace(),
            KeyCode::Delete => self.active_input().handle_delete(),
            KeyCode::Char(c) => self.active_input().handle_char(c),
            _ => {}
        }
    }

    fn submit_dialog(&mut self) {
        match self.state {
            AppState::NewStore => self.submit_store_path(true),
            AppState::OpenStore => self.submit_store_path(false),
            AppState::CreatePeriod => self.create_period(),
            AppState::CreateTask => self.create_task(),
            AppState::AssignResource => self.assign_resource(),
            AppState::Main | AppState::TaskDetail | AppState::SelectPeriod | AppState::Help => {}
        }
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    // Rendering

    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Body
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        let screen = Block::default().style(Style::default().bg(self.theme.background()).fg(self.theme.text()));
        f.render_widget(screen, f.area());

        self.render_header(f, chunks[0]);
        self.render_tabs(f, chunks[1]);
        if !self.ui_enabled() {
            self.render_welcome(f, chunks[2]);
        } else {
            match self.tab {
                Tab::Board => self.render_board(f, chunks[2]),
                Tab::Unassigned => self.render_unassigned(f, chunks[2]),
                Tab::Statistics => self.render_statistics(f, chunks[2]),
            }
        }
        self.render_status_bar(f, chunks[3]);

        match self.state {
            AppState::Main => {}
            AppState::TaskDetail => self.render_task_detail(f),
            AppState::Help => self.render_help(f),
            AppState::SelectPeriod => self.render_select_period(f),
            AppState::NewStore => {
                let fields = [("Store file to create", &self.path_input)];
                render_form(f, self.theme, "New Store", &fields, 0, 50, 25);
            }
            AppState::OpenStore => {
                let fields = [("Store file to open", &self.path_input)];
                render_form(f, self.theme, "Open Store", &fields, 0, 50, 25);
            }
            AppState::AssignResource => {
                let title = match self.assign_target {
                    Some((id, _)) => format!("Assign Resource to #{id}"),
                    None => "Assign Resource".to_string(),
                };
                let fields = [("Resource name", &self.resource_input)];
                render_form(f, self.theme, &title, &fields, 0, 50, 25);
            }
            AppState::CreateTask => {
                let form = &self.task_form;
                let fields = [
                    ("Title *", &form.title),
                    ("Description", &form.description),
                    ("Project *", &form.project),
                ];
                render_form(f, self.theme, "Create Task", &fields, form.current_field, 60, 45);
            }
            AppState::CreatePeriod => {
                let form = &self.period_form;
                let fields = [
                    ("Period name *", &form.name),
                    ("Start date (MM/DD/YY)", &form.start),
                    ("End date (MM/DD/YY)", &form.end),
                ];
                render_form(f, self.theme, "Create Period", &fields, form.current_field, 60, 45);
            }
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let store = self
            .db
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| if self.db.is_open() { "(memory)".into() } else { "none".into() });
        let period = self
            .current_period
            .as_ref()
            .map(Period::label)
            .unwrap_or_else(|| "no period selected".into());

        let header_text = vec![Line::from(vec![
            Span::styled("KANBAN", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("Store: {store}  Period: {period}"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];

        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|t| match t {
                Tab::Unassigned => Line::from(format!("{} ({})", t.title(), self.unassigned.len())),
                Tab::Board | Tab::Statistics => Line::from(t.title()),
            })
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_welcome(&self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("No store open", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("n  Create a new store"),
            Line::from("o  Open an existing store"),
            Line::from("q  Quit"),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        if self.current_period.is_none() {
            let paragraph = Paragraph::new("No period selected. Press p to create one or s to select one.")
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, area);
            return;
        }

        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let status = BOARD_STATUSES[column_index];
        let is_selected = column_index == self.selected_column;
        let accent = status_color(status);

        let border_style = if is_selected {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}) ", status.label(), self.columns[column_index].len()))
            .border_style(border_style);

        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.columns[column_index].is_empty() {
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = available_height / CARD_HEIGHT;
        let offset = if is_selected {
            let offset = scroll_offset(
                self.selected_card,
                self.column_scroll_offsets[column_index],
                visible_cards,
            );
            self.column_scroll_offsets[column_index] = offset;
            offset
        } else {
            self.column_scroll_offsets[column_index]
        };

        let cards = &self.columns[column_index];
        let mut current_y = 0;
        let mut rendered_cards = 0;
        for (card_index, task) in cards.iter().enumerate().skip(offset) {
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            render_card(f, self.theme, card_area, task, is_selected && card_index == self.selected_card);
            current_y += CARD_HEIGHT;
            rendered_cards += 1;
        }

        if offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{offset} above")).style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { x: inner.x, y: inner.y, width: inner.width, height: 1 });
        }
        let remaining = cards.len().saturating_sub(offset + rendered_cards);
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{remaining} below")).style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect { x: inner.x, y: inner.y + inner.height - 1, width: inner.width, height: 1 },
            );
        }
    }

    fn render_unassigned(&self, f: &mut Frame, area: Rect) {
        let header = Row::new(["ID", "Title", "Project", "Resource", "Created"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.unassigned.iter().map(|t| {
            Row::new(vec![
                Cell::from(format!("#{}", t.id)),
                Cell::from(t.title.clone()),
                Cell::from(t.project.clone()),
                Cell::from(t.resource_label().to_string()),
                Cell::from(format_opt_timestamp(Some(t.created_at))),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Min(20),
                Constraint::Length(16),
                Constraint::Length(14),
                Constraint::Length(17),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Unassigned tasks (Enter: move to Todo) "))
        .row_highlight_style(Style::default().bg(status_color(Status::Unassigned)).fg(Color::White));

        let mut state = TableState::default();
        if !self.unassigned.is_empty() {
            state.select(Some(self.selected_unassigned));
        }
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_statistics(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);

        let scope = self
            .current_period
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "all periods".into());
        let m = &self.metrics;
        let overall = vec![
            Line::from(format!("Total Tasks:              {}", m.total_tasks)),
            Line::from(format!("Average Time to Start:    {}", format_hours(m.avg_todo_to_inwork))),
            Line::from(format!("Average Time to Complete: {}", format_hours(m.avg_inwork_to_complete))),
            Line::from(format!("Average Total Time:       {}", format_hours(m.avg_total_time))),
        ];
        let paragraph = Paragraph::new(overall)
            .block(Block::default().borders(Borders::ALL).title(format!(" Overall Metrics ({scope}) ")));
        f.render_widget(paragraph, chunks[0]);

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        f.render_widget(group_table(" Metrics by Resource ", "Resource", &m.by_resource), halves[0]);
        f.render_widget(group_table(" Metrics by Project ", "Project", &m.by_project), halves[1]);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if !self.ui_enabled() {
            "n: New store | o: Open store | h: Help | q: Quit".to_string()
        } else if self.state.is_text_dialog() {
            "Tab: Next field | Enter: Save | Esc: Cancel".to_string()
        } else {
            match self.state {
                AppState::Main => match self.tab {
                    Tab::Board => "Enter: Start/Complete | r: Resource | d: Details | a: Task | p: Period | s: Select period | Tab: View | h: Help".to_string(),
                    Tab::Unassigned => "Enter: Move to Todo | r: Resource | d: Details | a: Task | Tab: View | h: Help".to_string(),
                    Tab::Statistics => "s: Select period | F5: Refresh | Tab: View | h: Help".to_string(),
                },
                AppState::SelectPeriod => "Up/Down: Choose | Enter: Select | Esc: Cancel".to_string(),
                _ => "Esc: Close".to_string(),
            }
        };

        let bg = if !self.ui_enabled() {
            DARK_RED
        } else if self.tab == Tab::Board {
            status_color(BOARD_STATUSES[self.selected_column])
        } else {
            STEEL_BLUE
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(text_on(bg)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_task_detail(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, area);

        let period = match (task.period_id, &self.current_period) {
            (Some(id), Some(p)) if p.id == id => p.name.clone(),
            (Some(id), _) => format!("#{id}"),
            (None, _) => "-".into(),
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("Task #{}: {}", task.id, task.title),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Status:       {}", task.status.label())),
            Line::from(format!("Project:      {}", task.project)),
            Line::from(format!("Resource:     {}", task.resource_label())),
            Line::from(format!("Period:       {period}")),
            Line::from(format!("Created:      {}", format_opt_timestamp(Some(task.created_at)))),
            Line::from(format!("Todo:         {}", format_opt_timestamp(task.todo_at))),
            Line::from(format!("In Progress:  {}", format_opt_timestamp(task.inwork_at))),
            Line::from(format!("Completed:    {}", format_opt_timestamp(task.completed_at))),
            Line::from(""),
            Line::from("Description:"),
            Line::from(task.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("-").to_string()),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Esc to close)")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(status_color(task.status)).add_modifier(Modifier::BOLD));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(self.theme.surface()).fg(self.theme.text()));
        f.render_widget(paragraph, area);
    }

    fn render_select_period(&self, f: &mut Frame) {
        let area = centered_rect(50, 50, f.area());
        f.render_widget(Clear, area);

        let current = self.current_period.as_ref().map(|p| p.id);
        let lines: Vec<Line> = self
            .periods
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let marker = if Some(p.id) == current { "* " } else { "  " };
                let style = if i == self.period_cursor {
                    Style::default().bg(GOLD).fg(text_on(GOLD)).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{marker}{}", p.label()), style))
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select Period")
                .style(Style::default().bg(self.theme.surface()).fg(self.theme.text())),
        );
        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let area = centered_rect(70, 80, f.area());
        f.render_widget(Clear, area);
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Kanban Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Store:", bold)),
            Line::from("  n            Create a new store"),
            Line::from("  o            Open an existing store"),
            Line::from(""),
            Line::from(Span::styled("Views:", bold)),
            Line::from("  Tab/1/2/3    Board, Unassigned, Statistics"),
            Line::from("  s            Select the period shown"),
            Line::from("  F5           Reload every view"),
            Line::from(""),
            Line::from(Span::styled("Tasks:", bold)),
            Line::from("  a            Create a task (starts unassigned)"),
            Line::from("  p            Create a period (dates MM/DD/YY)"),
            Line::from("  ←/→ ↑/↓      Move between columns and cards"),
            Line::from("  Enter/Space  Unassigned → Todo → In Progress → Completed"),
            Line::from("  r            Assign a resource"),
            Line::from("  d            Task details"),
            Line::from(""),
            Line::from("  t            Toggle light/dark theme"),
            Line::from("  h/?/F1       Show this help"),
            Line::from("  q/Esc/Ctrl+C Quit"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return")
                    .style(Style::default().bg(self.theme.surface()).fg(self.theme.text())),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Main event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Render a single task card
fn render_card(f: &mut Frame, theme: Theme, area: Rect, task: &Task, is_selected: bool) {
    let accent = status_color(task.status);
    let style = if is_selected {
        Style::default().bg(accent).fg(text_on(accent)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(theme.card()).fg(theme.text())
    };

    let width = area.width.saturating_sub(2) as usize;
    let mut card_text = vec![Line::from(format!("#{}", task.id))];
    card_text.extend(wrap_words(&task.title, width, 2).into_iter().map(Line::from));
    card_text.push(Line::from(truncate(
        &format!("{} | {}", task.resource_label(), task.project),
        width,
    )));

    let card = Paragraph::new(card_text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(card, area);
}

/// A centred dialog with one bordered input per field; `focus` gets the cursor.
fn render_form(f: &mut Frame, theme: Theme, title: &str, fields: &[(&str, &InputField)], focus: usize, pct_x: u16, pct_y: u16) {
    let area = centered_rect(pct_x, pct_y, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(Style::default().bg(theme.surface()).fg(theme.text()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, (label, input)) in fields.iter().enumerate() {
        let border_style = if i == focus {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(label.to_string())
                .border_style(border_style),
        );
        f.render_widget(widget, chunks[i]);

        if i == focus {
            let x = chunks[i].x + 1 + (input.cursor as u16).min(chunks[i].width.saturating_sub(2));
            f.set_cursor_position((x, chunks[i].y + 1));
        }
    }
}

fn group_table<'a>(title: &'a str, key: &'a str, groups: &'a std::collections::BTreeMap<String, GroupMetrics>) -> Table<'a> {
    let header = Row::new([key, "Completed", "Avg completion"]).style(Style::default().add_modifier(Modifier::BOLD));
    let rows = groups.iter().map(|(name, g)| {
        Row::new(vec![
            Cell::from(name.as_str()),
            Cell::from(g.tasks_completed.to_string()),
            Cell::from(format_hours(g.avg_completion_time)),
        ])
    });
    Table::new(rows, [Constraint::Min(12), Constraint::Length(10), Constraint::Length(16)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn open_db() -> Database {
        let mut db = Database::new();
        db.connect_in_memory().unwrap();
        db.create_schema().unwrap();
        db
    }

    fn app_with(db: Database) -> App {
        App::new_on(db, &Config::default(), today())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    /// Store with one period covering `today()` and one unassigned task.
    fn seeded_db() -> Database {
        let db = open_db();
        PeriodManager::new(&db).create_period("March", "3/1/24", "3/14/24").unwrap();
        TaskManager::new(&db).create_task("Write docs", Some("all of them"), "docs").unwrap();
        db
    }

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 0, 3), 0);
        assert_eq!(scroll_offset(4, 0, 3), 2);
        assert_eq!(scroll_offset(1, 2, 3), 1);
        assert_eq!(scroll_offset(3, 2, 3), 2);
        assert_eq!(scroll_offset(5, 0, 0), 5);
    }

    #[test]
    fn test_disabled_until_store_opened() {
        let mut app = app_with(Database::new());
        assert!(!app.ui_enabled());
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::Main);
        assert!(app.status_message.contains("No store open"));
        assert!(screen(&mut app).contains("No store open"));
    }

    #[test]
    fn test_startup_with_open_store_selects_current_period() {
        let mut app = app_with(seeded_db());
        assert!(app.ui_enabled());
        assert_eq!(app.current_period.as_ref().map(|p| p.name.as_str()), Some("March"));
        assert_eq!(app.unassigned.len(), 1);
        assert_eq!(app.periods.len(), 1);
        let text = screen(&mut app);
        assert!(text.contains("Todo"));
        assert!(text.contains("In Progress"));
        assert!(text.contains("Completed"));
    }

    #[test]
    fn test_open_store_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");
        {
            let mut db = Database::new();
            db.create_store(&path).unwrap();
            PeriodManager::new(&db).create_period("March", "3/1/24", "3/14/24").unwrap();
            TaskManager::new(&db).create_task("Existing", None, "ops").unwrap();
        }

        let mut app = app_with(Database::new());
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.state, AppState::OpenStore);
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::Main);
        assert!(app.ui_enabled());
        assert_eq!(app.current_period.as_ref().map(|p| p.name.as_str()), Some("March"));
        assert_eq!(app.unassigned[0].title, "Existing");
    }

    #[test]
    fn test_open_store_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE notes (id INTEGER PRIMARY KEY)", []).unwrap();
        }
        let mut app = app_with(Database::new());
        press(&mut app, KeyCode::Char('o'));
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::OpenStore);
        assert!(!app.ui_enabled());
        assert!(app.status_message.starts_with("Error:"));
    }

    #[test]
    fn test_new_store_dialog_enables_ui() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");
        let mut app = app_with(Database::new());
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);
        assert!(app.ui_enabled());
        assert!(path.exists());
        assert!(app.current_period.is_none());
    }

    #[test]
    fn test_create_task_refreshes_unassigned_only() {
        let mut app = app_with(seeded_db());
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::CreateTask);
        type_text(&mut app, "Fix login");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "oauth flow");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "auth");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::Main);
        assert_eq!(app.unassigned.len(), 2);
        assert_eq!(app.unassigned[1].project, "auth");
        assert!(app.columns.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_create_task_validation_keeps_dialog_open() {
        let mut app = app_with(seeded_db());
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "No project");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::CreateTask);
        assert_eq!(app.status_message, "Project name cannot be empty");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Main);
        assert_eq!(app.unassigned.len(), 1);
    }

    #[test]
    fn test_create_period_with_prefilled_dates() {
        let mut app = app_with(open_db());
        assert!(app.current_period.is_none());
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.period_form.start.value, "03/05/24");
        assert_eq!(app.period_form.end.value, "03/18/24");
        type_text(&mut app, "Sprint 9");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::Main);
        assert_eq!(app.periods.len(), 1);
        assert_eq!(app.current_period.as_ref().map(|p| p.name.as_str()), Some("Sprint 9"));
    }

    #[test]
    fn test_create_period_errors_are_shown() {
        let mut app = app_with(open_db());
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::CreatePeriod);
        assert_eq!(app.status_message, "Period name cannot be empty");

        type_text(&mut app, "Q1");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::End);
        for _ in 0..8 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "1st of May");
        press(&mut app, KeyCode::Enter);
        assert!(app.status_message.contains("Invalid date format"));
        assert!(app.periods.is_empty());
    }

    #[test]
    fn test_move_to_todo_needs_period() {
        let db = open_db();
        TaskManager::new(&db).create_task("t", None, "p").unwrap();
        let mut app = app_with(db);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_message, "Please select a period first.");
        assert_eq!(app.unassigned.len(), 1);
    }

    #[test]
    fn test_card_actions_walk_the_board() {
        let mut app = app_with(seeded_db());

        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert!(app.unassigned.is_empty());
        assert_eq!(app.columns[0].len(), 1);
        assert_eq!(app.metrics.total_tasks, 0);

        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        assert!(app.columns[0].is_empty());
        assert_eq!(app.columns[1][0].status, Status::InWork);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.columns[2].len(), 1);
        assert_eq!(app.metrics.total_tasks, 1);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert!(app.status_message.contains("already completed"));
        assert!(screen(&mut app).contains("Write docs"));
    }

    #[test]
    fn test_assign_resource_from_board() {
        let db = seeded_db();
        TaskManager::new(&db).move_to_todo(1, 1).unwrap();
        let mut app = app_with(db);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.state, AppState::AssignResource);
        type_text(&mut app, "frank");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::Main);
        assert_eq!(app.columns[0][0].resource.as_deref(), Some("frank"));
        assert!(screen(&mut app).contains("frank | docs"));
    }

    #[test]
    fn test_select_period_changes_board() {
        let db = seeded_db();
        let other = PeriodManager::new(&db).create_period("April", "4/1/24", "4/14/24").unwrap();
        let id = TaskManager::new(&db).create_task("Later", None, "docs").unwrap();
        TaskManager::new(&db).move_to_todo(id, other).unwrap();
        let mut app = app_with(db);
        assert!(app.columns[0].is_empty());

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.state, AppState::SelectPeriod);
        assert_eq!(app.period_cursor, 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.current_period.as_ref().map(|p| p.id), Some(other));
        assert_eq!(app.columns[0][0].title, "Later");
    }

    #[test]
    fn test_detail_and_help_overlays() {
        let mut app = app_with(seeded_db());
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::TaskDetail);
        assert!(screen(&mut app).contains("all of them"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Main);

        press(&mut app, KeyCode::Char('h'));
        assert!(screen(&mut app).contains("Kanban Help"));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state, AppState::Main);
    }

    #[test]
    fn test_statistics_tab_renders_metrics() {
        let db = seeded_db();
        let tasks = TaskManager::new(&db);
        tasks.move_to_todo(1, 1).unwrap();
        tasks.assign_resource(1, "gina").unwrap();
        tasks.start_task(1).unwrap();
        tasks.complete_task(1).unwrap();
        let mut app = app_with(db);
        press(&mut app, KeyCode::Char('3'));
        let text = screen(&mut app);
        assert!(text.contains("Total Tasks:              1"));
        assert!(text.contains("gina"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(Database::new());
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        press(&mut app, KeyCode::Char('n'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.path_input.value, "q");
    }

    #[test]
    fn test_oversized_period_span_does_not_crash() {
        let config = Config { default_period_days: u32::MAX, ..Config::default() };
        let mut app = App::new_on(open_db(), &config, today());
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.state, AppState::CreatePeriod);
        assert_eq!(app.period_form.end.value, "03/05/24");
    }

    #[test]
    fn test_open_dialog_does_not_create_mistyped_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");
        let mut app = app_with(Database::new());
        press(&mut app, KeyCode::Char('o'));
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::OpenStore);
        assert!(!app.ui_enabled());
        assert!(!path.exists());
    }

    #[test]
    fn test_theme_toggle_key() {
        let config = Config { theme: Theme::Light, ..Config::default() };
        let mut app = App::new_on(seeded_db(), &config, today());
        assert_eq!(app.theme, Theme::Light);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme, Theme::Dark);
        assert_eq!(app.status_message, "Theme: dark");
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme, Theme::Light);
        assert!(screen(&mut app).contains("Todo"));
    }
}
