//! User configuration loaded from `config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! The file is looked up at `--config PATH`, then `$KANBAN_CONFIG_DIR/config.toml`,
//! then `<platform config dir>/kanban/config.toml`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{KanbanError, Result};
use crate::fields::TransitionPolicy;
use crate::tui::colors::Theme;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "KANBAN_CONFIG_DIR";
/// Environment variable overriding the data directory (default log location).
pub const DATA_DIR_ENV: &str = "KANBAN_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store opened when `--db` is not given.
    pub store: Option<PathBuf>,
    pub transitions: TransitionPolicy,
    /// Filter used when neither `KANBAN_LOG` nor `RUST_LOG` is set.
    pub log_level: String,
    /// Log file for the interactive board.
    pub log_file: Option<PathBuf>,
    /// Span pre-filled in the new period dialog.
    pub default_period_days: u32,
    /// Palette the board starts with.
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: None,
            transitions: TransitionPolicy::Strict,
            log_level: "info".into(),
            log_file: None,
            default_period_days: 14,
            theme: Theme::Dark,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| KanbanError::Config(format!("{}: {e}", path.display())))
    }

    /// Load from `explicit`, or the default location. A missing file at the
    /// default location yields defaults; an explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let path = Self::default_config_path();
        if path.exists() {
            debug!(path = %path.display(), "loading config");
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KanbanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `config.toml` inside [`config_dir`].
    pub fn default_config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Log file for the interactive board: the configured one or `<data dir>/kanban.log`.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("kanban.log"))
    }
}

/// Config directory, honouring `KANBAN_CONFIG_DIR`.
pub fn config_dir() -> PathBuf {
    resolve_dir(std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir(), "/tmp/kanban-config")
}

/// Data directory, honouring `KANBAN_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    resolve_dir(std::env::var_os(DATA_DIR_ENV), dirs::data_dir(), "/tmp/kanban-data")
}

fn resolve_dir(override_dir: Option<OsString>, platform: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }
    platform
        .map(|d| d.join("kanban"))
        .unwrap_or_else(|| PathBuf::from(fallback))
}
