//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer never performs I/O or spawns tasks itself; cancellation is
//! decided by the reducer (`CancelTask`) and carried out by the runtime.

use dialtone_core::phone::PhoneNumber;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEffect {
    Quit,

    /// Run `SessionManager::login_with_cancel` in the background.
    SpawnLogin {
        task: TaskId,
        phone: PhoneNumber,
        cancel: CancellationToken,
    },

    /// Cancel a running task via its token.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },

    /// Clear the session. The session watch reports the new state.
    Logout,

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
