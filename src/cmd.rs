//! Command implementations for the CLI interface.
//!
//! Each handler takes an open [`Database`] (or the path to one) plus the
//! parsed arguments, prints its result to stdout and returns any failure to
//! `main`, which decides how to report it.

use std::path::Path;

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::config::Config;
use crate::db::*;
use crate::error::{KanbanError, Result};
use crate::fields::Status;
use crate::period::Period;
use crate::periods::PeriodManager;
use crate::stats::{GroupMetrics, StatisticsManager, TaskMetrics};
use crate::task::TaskHistory;
use crate::tasks::TaskManager;
use crate::tui::run::run_board;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board (the default).
    Ui,

    /// Create a store (or add missing tables to one).
    Init,

    /// Check that the store has the expected tables and columns.
    Check,

    /// Manage periods.
    Period {
        #[command(subcommand)]
        action: PeriodAction,
    },

    /// Add a new unassigned task.
    Add {
        /// Short title for the task.
        title: String,
        /// Project name.
        #[arg(long)]
        project: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Move an unassigned task into a period's todo column.
    Todo {
        /// Task ID.
        id: i64,
        /// Period name. Defaults to the period covering today.
        #[arg(long)]
        period: Option<String>,
    },

    /// Set the resource (person) working on a task.
    Assign {
        /// Task ID.
        id: i64,
        /// Free-text resource name.
        resource: String,
    },

    /// Start a todo task.
    Start {
        /// Task ID.
        id: i64,
    },

    /// Complete an in-progress task.
    Complete {
        /// Task ID.
        id: i64,
    },

    /// Show the three board columns for a period.
    Board {
        /// Period name. Defaults to the period covering today.
        #[arg(long)]
        period: Option<String>,
    },

    /// List tasks waiting to be scheduled.
    Unassigned,

    /// Completion statistics.
    Stats {
        /// Restrict to one period.
        #[arg(long)]
        period: Option<String>,
        /// Print JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Every task with its stage timestamps and period.
    History {
        /// Restrict to one period.
        #[arg(long)]
        period: Option<String>,
        /// Only tasks currently in this status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the effective settings and where they are read from.
    Config {
        /// Write the effective settings to the config file.
        #[arg(long)]
        write: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PeriodAction {
    /// Create a period. Dates are MM/DD/YY.
    Add {
        name: String,
        start: String,
        end: String,
    },
    /// List all periods, earliest first.
    List,
    /// Show the period covering today.
    Current,
}

/// Launch the interactive board, opening `store` first when one is known.
pub fn cmd_ui(store: Option<&Path>, config: &Config) -> Result<()> {
    let mut db = Database::new();
    if let Some(path) = store {
        db.open_verified(path)?;
    }
    run_board(db, config)
}

/// Create the store file and schema.
pub fn cmd_init(path: &Path) -> Result<()> {
    let mut db = Database::new();
    db.create_store(path)?;
    println!("Store ready at {}", path.display());
    Ok(())
}

/// Report whether the store's schema is usable.
pub fn cmd_check(path: &Path) -> Result<()> {
    let mut db = Database::new();
    db.open_verified(path)?;
    println!("{}: schema OK", path.display());
    Ok(())
}

pub fn cmd_period(db: &Database, action: PeriodAction) -> Result<()> {
    let periods = PeriodManager::new(db);
    match action {
        PeriodAction::Add { name, start, end } => {
            let id = periods.create_period(&name, &start, &end)?;
            let period = periods.get_period(id)?;
            println!("Created period #{} {}", period.id, period.label());
        }
        PeriodAction::List => {
            let all = periods.get_all_periods()?;
            let today = chrono::Local::now().date_naive();
            println!("{:<5} {:<20} {:<10} {:<10} {}", "ID", "Name", "Start", "End", "Days");
            for p in all {
                let marker = if p.contains(today) { " *" } else { "" };
                println!(
                    "{:<5} {:<20} {:<10} {:<10} {}{}",
                    p.id,
                    truncate(&p.name, 20),
                    format_input_date(p.start_date),
                    format_input_date(p.end_date),
                    p.length_days(),
                    marker
                );
            }
        }
        PeriodAction::Current => match db.current_period()? {
            Some(p) => println!("{}", p.label()),
            None => println!("No period covers today."),
        },
    }
    Ok(())
}

pub fn cmd_add(db: &Database, config: &Config, title: String, project: String, desc: Option<String>) -> Result<()> {
    let tasks = TaskManager::with_policy(db, config.transitions);
    let id = tasks.create_task(&title, desc.as_deref(), &project)?;
    println!("Added task #{id}");
    Ok(())
}

pub fn cmd_todo(db: &Database, config: &Config, id: i64, period: Option<String>) -> Result<()> {
    let Some(target) = resolve_period(db, period.as_deref())? else {
        println!("Please select a period first.");
        return Ok(());
    };
    TaskManager::with_policy(db, config.transitions).move_to_todo(id, target.id)?;
    println!("Task #{id} moved to Todo in {}", target.name);
    Ok(())
}

pub fn cmd_assign(db: &Database, config: &Config, id: i64, resource: String) -> Result<()> {
    TaskManager::with_policy(db, config.transitions).assign_resource(id, &resource)?;
    println!("Task #{id} assigned to {resource}");
    Ok(())
}

pub fn cmd_start(db: &Database, config: &Config, id: i64) -> Result<()> {
    TaskManager::with_policy(db, config.transitions).start_task(id)?;
    println!("Task #{id} started");
    Ok(())
}

pub fn cmd_complete(db: &Database, config: &Config, id: i64) -> Result<()> {
    TaskManager::with_policy(db, config.transitions).complete_task(id)?;
    println!("Task #{id} completed");
    Ok(())
}

/// Print the Todo / In Progress / Completed columns of a period.
pub fn cmd_board(db: &Database, period: Option<String>) -> Result<()> {
    let Some(target) = resolve_period(db, period.as_deref())? else {
        println!("No period covers today; pass --period NAME.");
        return Ok(());
    };
    let tasks = TaskManager::new(db).get_tasks_by_period(target.id)?;
    println!("{}", target.label());
    for status in Status::ALL.into_iter().filter(|s| s.board_column().is_some()) {
        let column: Vec<_> = tasks.iter().filter(|t| t.status == status).cloned().collect();
        println!("\n== {} ({}) ==", status.label(), column.len());
        if !column.is_empty() {
            print_task_table(&column);
        }
    }
    Ok(())
}

pub fn cmd_unassigned(db: &Database) -> Result<()> {
    let tasks = TaskManager::new(db).get_unassigned_tasks()?;
    if tasks.is_empty() {
        println!("No unassigned tasks.");
    } else {
        print_task_table(&tasks);
    }
    Ok(())
}

pub fn cmd_stats(db: &Database, period: Option<String>, json: bool) -> Result<()> {
    let period_id = match period.as_deref() {
        Some(name) => Some(PeriodManager::new(db).require_period(name)?.id),
        None => None,
    };
    let metrics = StatisticsManager::new(db).calculate_task_metrics(period_id)?;
    if json {
        print_json(&metrics);
    } else {
        print_metrics(&metrics);
    }
    Ok(())
}

pub fn cmd_history(db: &Database, period: Option<String>, status: Option<Status>, json: bool) -> Result<()> {
    let history = history_rows(db, period.as_deref(), status)?;
    if json {
        print_json(&history);
    } else {
        print_history(&history);
    }
    Ok(())
}

/// Print `config` as TOML; with `write`, save it to `path` first.
pub fn cmd_config(config: &Config, path: &Path, write: bool) -> Result<()> {
    if write {
        config.save_to_file(path)?;
        println!("Wrote {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    let text = toml::to_string_pretty(config).map_err(|e| KanbanError::Config(e.to_string()))?;
    print!("{text}");
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

fn history_rows(db: &Database, period: Option<&str>, status: Option<Status>) -> Result<Vec<TaskHistory>> {
    let period_id = match period {
        Some(name) => Some(PeriodManager::new(db).require_period(name)?.id),
        None => None,
    };
    let mut history = StatisticsManager::new(db).get_task_history(period_id)?;
    if let Some(status) = status {
        history.retain(|row| row.status == status);
    }
    Ok(history)
}

/// A named period, or the one covering today when no name is given.
fn resolve_period(db: &Database, name: Option<&str>) -> Result<Option<Period>> {
    match name {
        Some(name) => PeriodManager::new(db).require_period(name).map(Some),
        None => db.current_period(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to serialise output: {e}"),
    }
}

fn print_groups(heading: &str, groups: &std::collections::BTreeMap<String, GroupMetrics>) {
    println!("\n{:<20} {:>9} {:>16}", heading, "Completed", "Avg total");
    if groups.is_empty() {
        println!("{:<20}", "-");
    }
    for (key, g) in groups {
        println!(
            "{:<20} {:>9} {:>16}",
            truncate(key, 20),
            g.tasks_completed,
            format_hours(g.avg_completion_time)
        );
    }
}

fn print_metrics(m: &TaskMetrics) {
    println!("Completed tasks:        {}", m.total_tasks);
    println!("Avg todo -> in work:    {}", format_hours(m.avg_todo_to_inwork));
    println!("Avg in work -> done:    {}", format_hours(m.avg_inwork_to_complete));
    println!("Avg total time:         {}", format_hours(m.avg_total_time));
    print_groups("Resource", &m.by_resource);
    print_groups("Project", &m.by_project);
}

fn print_history(rows: &[TaskHistory]) {
    println!(
        "{:<5} {:<24} {:<12} {:<12} {:<12} {:<16} {:<16} {:<16} {}",
        "ID", "Title", "Status", "Resource", "Project", "Todo", "In work", "Completed", "Period"
    );
    for h in rows {
        println!(
            "{:<5} {:<24} {:<12} {:<12} {:<12} {:<16} {:<16} {:<16} {}",
            h.id,
            truncate(&h.title, 24),
            h.status.label(),
            truncate(h.resource.as_deref().unwrap_or("-"), 12),
            truncate(&h.project, 12),
            format_opt_timestamp(h.todo_at),
            format_opt_timestamp(h.inwork_at),
            format_opt_timestamp(h.completed_at),
            h.period_name.as_deref().unwrap_or("-")
        );
    }
}
