//! Enumerations for TUI state management.

/// Which screen or dialog currently receives key presses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Main,
    TaskDetail,
    NewStore,
    OpenStore,
    CreatePeriod,
    CreateTask,
    AssignResource,
    SelectPeriod,
    Help,
}

impl AppState {
    /// Dialogs that take text input.
    pub fn is_text_dialog(self) -> bool {
        matches!(
            self,
            AppState::NewStore
                | AppState::OpenStore
                | AppState::CreatePeriod
                | AppState::CreateTask
                | AppState::AssignResource
        )
    }
}

/// Top-level tabs of the main screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Board,
    Unassigned,
    Statistics,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Board, Tab::Unassigned, Tab::Statistics];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Board => "Board",
            Tab::Unassigned => "Unassigned",
            Tab::Statistics => "Statistics",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Board => 0,
            Tab::Unassigned => 1,
            Tab::Statistics => 2,
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}
