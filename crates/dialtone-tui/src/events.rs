//! UI events consumed by the reducer.

use crossterm::event::Event;
use dialtone_core::session::{LoginError, SessionState};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

/// How a login task ended, as far as the screen is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Succeeded,
    Failed,
    Cancelled,
    /// Another login was already running; the manager owns that one.
    Busy,
}

impl From<&Result<(), LoginError>> for LoginOutcome {
    fn from(result: &Result<(), LoginError>) -> Self {
        match result {
            Ok(()) => Self::Succeeded,
            Err(LoginError::Fetch(_)) => Self::Failed,
            Err(LoginError::Cancelled) => Self::Cancelled,
            Err(LoginError::InFlight) => Self::Busy,
        }
    }
}

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick; advances the spinner and triggers a render.
    Tick,
    Terminal(Event),
    /// New session snapshot from the manager's watch channel.
    Session(SessionState),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    LoginFinished {
        outcome: LoginOutcome,
    },
    /// The system browser could not be launched.
    OpenFailed {
        message: String,
    },
}
