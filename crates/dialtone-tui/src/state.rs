//! Application state.
//!
//! ```text
//! AppState
//! ├── session: SessionState   (latest snapshot from the session watch)
//! ├── router: Router          (current route + guard redirects)
//! ├── auth: AuthFormState     (entry screen form)
//! ├── dashboard: DashboardState
//! ├── task_seq / tasks        (background task lifecycle)
//! └── spinner_frame, should_quit
//! ```

use dialtone_core::config::RoutesConfig;
use dialtone_core::guard::{GuardDecision, Router};
use dialtone_core::session::{SessionPhase, SessionState};

use crate::auth::AuthFormState;
use crate::common::{TaskSeq, Tasks};
use crate::dashboard::DashboardState;

/// What the current frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Auth,
    Dashboard,
}

#[derive(Debug)]
pub struct AppState {
    pub session: SessionState,
    pub router: Router,
    pub auth: AuthFormState,
    pub dashboard: DashboardState,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    /// Starts on the protected route with an unhydrated session, so the
    /// guards pick the first real screen.
    pub fn new(routes: &RoutesConfig) -> Self {
        Self {
            session: SessionState::initial(),
            router: Router::new(routes, routes.protected_route()),
            auth: AuthFormState::default(),
            dashboard: DashboardState::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.router.decide(&self.session) {
            GuardDecision::Pending | GuardDecision::Redirect(_) => Screen::Loading,
            GuardDecision::Render => {
                let current = self.router.current();
                if current == self.router.entry() {
                    Screen::Auth
                } else if current == self.router.protected() && self.session.user().is_some() {
                    Screen::Dashboard
                } else {
                    Screen::Loading
                }
            }
        }
    }

    /// True from the moment a login is requested until it finishes.
    pub fn is_login_pending(&self) -> bool {
        self.tasks.login.is_running() || self.session.phase() == SessionPhase::Authenticating
    }
}
