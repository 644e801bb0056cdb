//! Auth screen reducer.

use crossterm::event::{KeyCode, KeyEvent};

use super::{AUTH_FAILED_MESSAGE, AuthFormState};
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::LoginOutcome;
use crate::state::AppState;

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if app.is_login_pending() {
        // The form is disabled while authenticating; Esc cancels.
        return match key.code {
            KeyCode::Esc => vec![UiEffect::CancelTask {
                kind: TaskKind::Login,
                token: app.tasks.login.cancel.clone(),
            }],
            _ => vec![],
        };
    }

    match key.code {
        KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Enter => submit(app),
        KeyCode::Backspace => {
            app.auth.backspace();
            vec![]
        }
        KeyCode::Char(c) => {
            app.auth.insert_digits(c.encode_utf8(&mut [0; 4]));
            vec![]
        }
        _ => vec![],
    }
}

pub fn handle_paste(app: &mut AppState, text: &str) {
    if !app.is_login_pending() {
        app.auth.insert_digits(text);
    }
}

fn submit(app: &mut AppState) -> Vec<UiEffect> {
    app.auth.submitted = true;
    let Ok(phone) = app.auth.validate() else {
        return vec![];
    };

    app.auth.failure = None;
    let task = app.task_seq.next_id();
    let cancel = app.tasks.login.begin(task);
    vec![UiEffect::SpawnLogin {
        task,
        phone,
        cancel,
    }]
}

pub fn handle_login_finished(form: &mut AuthFormState, outcome: LoginOutcome) {
    match outcome {
        LoginOutcome::Succeeded => form.reset(),
        LoginOutcome::Failed => form.failure = Some(AUTH_FAILED_MESSAGE.to_string()),
        LoginOutcome::Cancelled | LoginOutcome::Busy => {}
    }
}
