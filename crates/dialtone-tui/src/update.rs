//! TUI reducer.
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, Screen};
use crate::{auth, dashboard};

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Session(state) => {
            app.session = state;
            sync_route(app);
            vec![]
        }
        UiEvent::TaskStarted { kind, started } => {
            app.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                vec![]
            }
        }
        UiEvent::LoginFinished { outcome } => {
            debug!(?outcome, "login finished");
            auth::handle_login_finished(&mut app.auth, outcome);
            vec![]
        }
        UiEvent::OpenFailed { message } => {
            app.dashboard.notice = Some(message);
            vec![]
        }
    }
}

/// Applies guard redirects for the latest session snapshot.
fn sync_route(app: &mut AppState) {
    let Some(nav) = app.router.sync(&app.session) else {
        return;
    };
    if nav.to == *app.router.entry() {
        app.auth.reset();
    }
    if nav.from == *app.router.protected() {
        app.dashboard.notice = None;
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Paste(text) => {
            if app.screen() == Screen::Auth {
                auth::handle_paste(app, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    match app.screen() {
        Screen::Loading => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
            _ => vec![],
        },
        Screen::Auth => auth::handle_key(app, key),
        Screen::Dashboard => dashboard::handle_key(app, key),
    }
}
