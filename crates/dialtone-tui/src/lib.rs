//! Full-screen TUI for Dialtone: the auth form and the profile dashboard.
//!
//! Elm-style: `update` is a pure reducer over `AppState` that returns
//! `UiEffect`s, `render` draws, and `runtime` owns the terminal and executes
//! effects.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use dialtone_core::config::Config;
use dialtone_core::fetcher::RandomUserClient;
use dialtone_core::session::SessionManager;
use dialtone_core::storage::UserRecordStore;
pub use features::{auth, dashboard};
pub use runtime::TuiRuntime;

use crate::state::AppState;

/// Runs the interactive TUI until the user quits.
///
/// Must be called inside a tokio runtime context; the login fetch is spawned
/// onto it.
///
/// # Errors
/// Returns an error if stdout is not a terminal, the HTTP client cannot be
/// built, or terminal I/O fails.
pub fn run_interactive(config: &Config) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `dialtone login --phone <NUMBER>` for non-interactive use."
        );
    }

    let fetcher = RandomUserClient::from_config(config).context("create user fetcher")?;
    let session = Arc::new(SessionManager::new(UserRecordStore::open(config), fetcher));
    let state = AppState::new(&config.routes);

    let mut runtime = TuiRuntime::new(state, session)?;
    runtime.run()
}
