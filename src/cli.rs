use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Single-user kanban board backed by a local SQLite store.
/// Without a subcommand the interactive board is launched.
#[derive(Parser)]
#[command(name = "kanban", version, about = "Kanban task tracker with sprints and statistics")]
pub struct Cli {
    /// Path to the SQLite store. Overrides `store` from the config file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
