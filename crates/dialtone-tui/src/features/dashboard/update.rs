use crossterm::event::{KeyCode, KeyEvent};

use crate::effects::UiEffect;
use crate::state::AppState;

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Char('s') => {
            app.dashboard.notice = None;
            vec![UiEffect::Logout]
        }
        KeyCode::Char('o') => match app.session.user() {
            Some(user) => {
                app.dashboard.notice = None;
                vec![UiEffect::OpenBrowser {
                    url: user.picture().large.clone(),
                }]
            }
            None => vec![],
        },
        _ => vec![],
    }
}
