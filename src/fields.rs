//! Enumerations shared by storage, commands and the board.
//!
//! `Status` is the closed set of board columns a task can sit in. Its storage
//! strings are the ones persisted in the `tasks.status` column.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task lifecycle status. Transitions run forward only:
/// unassigned → todo → inwork → completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unassigned,
    Todo,
    #[value(name = "inwork")]
    InWork,
    Completed,
}

impl Status {
    /// Every status in lifecycle order.
    pub const ALL: [Status; 4] = [Status::Unassigned, Status::Todo, Status::InWork, Status::Completed];

    /// String stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unassigned => "unassigned",
            Status::Todo => "todo",
            Status::InWork => "inwork",
            Status::Completed => "completed",
        }
    }

    /// The status a task moves to next, if any.
    pub fn next(self) -> Option<Status> {
        match self {
            Status::Unassigned => Some(Status::Todo),
            Status::Todo => Some(Status::InWork),
            Status::InWork => Some(Status::Completed),
            Status::Completed => None,
        }
    }

    /// The status a task must be in before it may move to `self`.
    pub fn predecessor(self) -> Option<Status> {
        match self {
            Status::Unassigned => None,
            Status::Todo => Some(Status::Unassigned),
            Status::InWork => Some(Status::Todo),
            Status::Completed => Some(Status::InWork),
        }
    }

    /// Board column index (0 = Todo, 1 = In Progress, 2 = Completed).
    /// Unassigned tasks live on their own tab.
    pub fn board_column(self) -> Option<usize> {
        match self {
            Status::Unassigned => None,
            Status::Todo => Some(0),
            Status::InWork => Some(1),
            Status::Completed => Some(2),
        }
    }

    /// Human label used in tables and cards.
    pub fn label(self) -> &'static str {
        match self {
            Status::Unassigned => "Unassigned",
            Status::Todo => "Todo",
            Status::InWork => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(Status::Unassigned),
            "todo" => Ok(Status::Todo),
            "inwork" => Ok(Status::InWork),
            "completed" => Ok(Status::Completed),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// How strictly forward transitions are checked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Each transition requires the task to be in the preceding status.
    #[default]
    Strict,
    /// A task may skip ahead to any later status, never back or in place.
    Permissive,
}

impl TransitionPolicy {
    /// Whether a task currently in `from` may be moved to `to`.
    pub fn allows(self, from: Status, to: Status) -> bool {
        match self {
            TransitionPolicy::Strict => to.predecessor() == Some(from),
            TransitionPolicy::Permissive => to > from,
        }
    }
}
