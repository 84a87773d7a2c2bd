//! Color constants for the terminal user interface.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::fields::Status;

/// Todo column
pub const STEEL_BLUE: Color = Color::Rgb(52, 101, 164);
/// In Progress column
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Completed column
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Unassigned tasks
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
/// Errors and the disabled screen
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Accent color for a task status.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::Unassigned => DARK_PURPLE,
        Status::Todo => STEEL_BLUE,
        Status::InWork => GOLD,
        Status::Completed => DARK_GREEN,
    }
}

/// Readable foreground for text drawn on `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}

/// Light or dark surface palette. Status accents are shared by both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Screen background behind every view.
    pub fn background(self) -> Color {
        match self {
            Theme::Dark => Color::Reset,
            Theme::Light => Color::Rgb(245, 245, 240),
        }
    }

    /// Popup and dialog background.
    pub fn surface(self) -> Color {
        match self {
            Theme::Dark => Color::Black,
            Theme::Light => Color::White,
        }
    }

    /// Background of cards that are not selected.
    pub fn card(self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Rgb(220, 220, 215),
        }
    }

    pub fn text(self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Rgb(20, 20, 20),
        }
    }
}
