//! # kanban - single-user kanban tracker
//!
//! A task board backed by a local SQLite store. Tasks are created
//! unassigned, scheduled into a named period (a sprint), then moved across
//! three columns: Todo, In Progress and Completed. Every stage change is
//! timestamped, and those timestamps feed the completion statistics.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a store
//! kanban --db board.db init
//!
//! # Add a sprint and a task, then schedule it
//! kanban --db board.db period add "Sprint 1" 1/1/25 1/14/25
//! kanban --db board.db add "Write release notes" --project docs
//! kanban --db board.db todo 1 --period "Sprint 1"
//!
//! # Open the interactive board
//! kanban --db board.db
//! ```
//!
//! ## Key Commands
//!
//! - `kanban` / `kanban ui` - interactive board
//! - `kanban period add|list|current` - manage periods
//! - `kanban add|todo|assign|start|complete` - move tasks through the board
//! - `kanban board|unassigned` - print columns
//! - `kanban stats|history [--json]` - reporting
//! - `kanban config [--write]` - show or save the effective settings
//!
//! Settings live in `config.toml` under the platform config directory
//! (override with `KANBAN_CONFIG_DIR` or `--config`). Set `store` there to
//! skip `--db`.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::error;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod period;
pub mod periods;
pub mod stats;
pub mod task;
pub mod tasks;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod period_form;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use db::Database;
use error::{KanbanError, Result};

/// Print an error the way the user should see it and exit.
fn fail(e: KanbanError) -> ! {
    if e.is_validation() {
        eprintln!("{e}");
    } else {
        error!(error = %e, "command failed");
        eprintln!("Error: {e}");
    }
    std::process::exit(1);
}

fn require_store(store: Option<PathBuf>) -> PathBuf {
    store.unwrap_or_else(|| {
        eprintln!("No store given. Pass --db PATH or set `store` in the config file.");
        std::process::exit(1);
    })
}

/// Launch the board. It owns the terminal, so it logs to a file.
fn run_ui(store: Option<&Path>, config: &Config) -> Result<()> {
    let _guard = match logging::init_file(&config.log_path(), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e}");
            None
        }
    };
    cmd_ui(store, config)
}

/// Open the store, run `f` against it and close it again.
fn with_store(store: Option<PathBuf>, f: impl FnOnce(&Database) -> Result<()>) -> Result<()> {
    let path = require_store(store);
    let mut db = Database::new();
    db.open_verified(&path)?;
    let result = f(&db);
    db.close();
    result
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let store = cli.db.clone().or_else(|| config.store.clone());
    let command = cli.command.unwrap_or(Commands::Ui);

    if !matches!(command, Commands::Ui) {
        logging::init_stderr(&config.log_level);
    }

    let result = match command {
        Commands::Ui => run_ui(store.as_deref(), &config),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        Commands::Config { write } => {
            let path = cli.config.clone().unwrap_or_else(Config::default_config_path);
            cmd_config(&config, &path, write)
        }
        Commands::Init => cmd_init(&require_store(store)),
        Commands::Check => cmd_check(&require_store(store)),
        Commands::Period { action } => with_store(store, |db| cmd_period(db, action)),
        Commands::Add { title, project, desc } => {
            with_store(store, |db| cmd_add(db, &config, title, project, desc))
        }
        Commands::Todo { id, period } => with_store(store, |db| cmd_todo(db, &config, id, period)),
        Commands::Assign { id, resource } => {
            with_store(store, |db| cmd_assign(db, &config, id, resource))
        }
        Commands::Start { id } => with_store(store, |db| cmd_start(db, &config, id)),
        Commands::Complete { id } => with_store(store, |db| cmd_complete(db, &config, id)),
        Commands::Board { period } => with_store(store, |db| cmd_board(db, period)),
        Commands::Unassigned => with_store(store, cmd_unassigned),
        Commands::Stats { period, json } => with_store(store, |db| cmd_stats(db, period, json)),
        Commands::History { period, status, json } => {
            with_store(store, |db| cmd_history(db, period, status, json))
        }
    };

    if let Err(e) = result {
        fail(e);
    }
}
