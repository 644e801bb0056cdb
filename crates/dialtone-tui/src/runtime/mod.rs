//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here; the reducer stays pure.
//!
//! Events arrive from three places each frame:
//! - the session watch channel (new `SessionState` snapshots)
//! - the inbox channel (background task lifecycle and results)
//! - the terminal (keys, paste, resize)

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use dialtone_core::interrupt;
use dialtone_core::session::{SessionManager, SessionState};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::{LoginOutcome, UiEvent};
use crate::state::AppState;
use crate::terminal::{self, Tui};
use crate::{render, update};

/// Tick cadence while something is animating.
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Tick cadence when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen TUI runtime. The terminal is restored on drop.
pub struct TuiRuntime {
    terminal: Tui,
    pub state: AppState,
    session: Arc<SessionManager>,
    session_rx: watch::Receiver<SessionState>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(state: AppState, session: Arc<SessionManager>) -> Result<Self> {
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let session_rx = session.subscribe();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state,
            session,
            session_rx,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Hydrates the session and runs the event loop until quit.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal events fails.
    pub fn run(&mut self) -> Result<()> {
        self.session.hydrate();
        let snapshot = self.session_rx.borrow_and_update().clone();
        self.dispatch_event(UiEvent::Session(snapshot));

        let mut dirty = true;
        while !self.state.should_quit {
            if interrupt::is_interrupted() {
                self.state.should_quit = true;
                break;
            }

            let events = self.collect_events()?;
            for event in events {
                // Key and session events redraw right away; ticks animate.
                if !matches!(event, UiEvent::TaskStarted { .. }) {
                    dirty = true;
                }
                self.dispatch_event(event);
            }

            if dirty && !self.state.should_quit {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }
        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        if self.session_rx.has_changed().unwrap_or(false) {
            let snapshot = self.session_rx.borrow_and_update().clone();
            events.push(UiEvent::Session(snapshot));
        }

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let animating = self.state.session.is_loading() || self.state.tasks.is_any_running();
        let tick_interval = if animating {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a cancellable task with a uniform TaskStarted/TaskCompleted
    /// lifecycle. `cancel` is the token the reducer already holds.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, cancel: CancellationToken, f: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let _ = tx.send(UiEvent::TaskStarted {
            kind,
            started: TaskStarted {
                id,
                cancel: Some(cancel.clone()),
            },
        });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let _ = tx.send(UiEvent::TaskCompleted {
                kind,
                completed: TaskCompleted {
                    id,
                    result: Box::new(inner),
                },
            });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::SpawnLogin {
                task,
                phone,
                cancel,
            } => {
                let session = Arc::clone(&self.session);
                self.spawn_task(TaskKind::Login, task, cancel, move |cancel| async move {
                    let result = session.login_with_cancel(phone.as_str(), cancel).await;
                    UiEvent::LoginFinished {
                        outcome: LoginOutcome::from(&result),
                    }
                });
            }
            UiEffect::CancelTask { kind, token } => {
                debug!(?kind, "cancelling task");
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
            UiEffect::Logout => {
                self.session.logout();
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(e) = open::that(&url) {
                    warn!(url = %url, error = %e, "failed to open browser");
                    self.dispatch_event(UiEvent::OpenFailed {
                        message: format!("Could not open browser: {e}"),
                    });
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        if let Some(cancel) = &self.state.tasks.login.cancel {
            cancel.cancel();
        }
        let _ = terminal::restore_terminal();
    }
}
