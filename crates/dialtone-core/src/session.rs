//! Session manager: the single authoritative "who is logged in" state.
//!
//! ## State machine
//!
//! ```text
//!            hydrate (record absent)
//! Hydrating ─────────────────────────► Anonymous ◄────────────┐
//!     │                                  │   ▲                │
//!     │ hydrate (record present)   login │   │ login failed   │ logout
//!     ▼                                  ▼   │ (user kept)    │
//! Authenticated ◄──────────────────── Authenticating          │
//!     │            fetch ok + saved                           │
//!     └───────────────────────────────────────────────────────┘
//! ```
//!
//! `login` from `Authenticated` passes through `Authenticating` with the
//! previous user still visible; a failure returns to `Authenticated`.
//!
//! Observers get snapshots through a `tokio::sync::watch` channel. Only one
//! login may be in flight; a second call is rejected with
//! `LoginError::InFlight` and does not touch state or storage.
//!
//! `logout` cancels an in-flight login. The login's commit (save + publish)
//! and logout's clear run under the same lock, so a fetch that resolves after
//! a logout never brings the session back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fetcher::{FetchFailure, UserFetcher};
use crate::storage::{UserRecordStore, error_chain};
use crate::user::UserRecord;

/// Coarse lifecycle phase derived from a `SessionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Hydrating,
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Hydrating,
    LoggingIn,
    Idle,
}

/// Snapshot of the session.
///
/// `is_authenticated()` is derived from the presence of a user, so the two
/// can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    user: Option<Arc<UserRecord>>,
    activity: Activity,
}

impl SessionState {
    /// State before hydration: loading, no user.
    pub fn initial() -> Self {
        Self {
            user: None,
            activity: Activity::Hydrating,
        }
    }

    /// Settled state with no user.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            activity: Activity::Idle,
        }
    }

    /// Settled state with `user` logged in.
    pub fn authenticated(user: UserRecord) -> Self {
        Self {
            user: Some(Arc::new(user)),
            activity: Activity::Idle,
        }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True while hydrating or while a login is in flight.
    pub fn is_loading(&self) -> bool {
        self.activity != Activity::Idle
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.activity, self.user.is_some()) {
            (Activity::Hydrating, _) => SessionPhase::Hydrating,
            (Activity::LoggingIn, _) => SessionPhase::Authenticating,
            (Activity::Idle, true) => SessionPhase::Authenticated,
            (Activity::Idle, false) => SessionPhase::Anonymous,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

/// User-facing message for a failed login.
pub const AUTH_FAILED_MESSAGE: &str =
    "Authentication failed. Please verify your phone number and try again.";

/// Why a login attempt did not produce a session.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
    #[error("a login is already in progress")]
    InFlight,
    #[error("login cancelled")]
    Cancelled,
}

/// Owns the session state and its transitions.
pub struct SessionManager {
    store: UserRecordStore,
    fetcher: Arc<dyn UserFetcher>,
    state: watch::Sender<SessionState>,
    hydration: Once,
    login_in_flight: AtomicBool,
    /// Cancel handle of the in-flight login; also serializes commit vs logout.
    active_login: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("state", &*self.state.borrow())
            .field("login_in_flight", &self.login_in_flight)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager in the `Hydrating` state. Call `hydrate()` next.
    pub fn new(store: UserRecordStore, fetcher: impl UserFetcher + 'static) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            store,
            fetcher: Arc::new(fetcher),
            state,
            hydration: Once::new(),
            login_in_flight: AtomicBool::new(false),
            active_login: Mutex::new(None),
        }
    }

    /// Creates a manager and hydrates it from the store.
    pub fn start(store: UserRecordStore, fetcher: impl UserFetcher + 'static) -> Self {
        let manager = Self::new(store, fetcher);
        manager.hydrate();
        manager
    }

    /// Loads the stored record into the session.
    ///
    /// Runs once per manager; later calls return the current state unchanged.
    pub fn hydrate(&self) -> SessionState {
        self.hydration.call_once(|| {
            let next = match self.store.load() {
                Some(user) => {
                    debug!(user_id = user.id(), "hydrated stored session");
                    SessionState::authenticated(user)
                }
                None => {
                    debug!("no stored session");
                    SessionState::anonymous()
                }
            };
            self.state.send_replace(next);
        });
        self.state()
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_login_in_flight(&self) -> bool {
        self.login_in_flight.load(Ordering::Acquire)
    }

    /// Logs in with a freshly fetched identity.
    ///
    /// `phone` is accepted for the caller's benefit; the fetched identity
    /// does not depend on it.
    ///
    /// # Errors
    /// `LoginError::Fetch` if the fetch fails, `LoginError::InFlight` if
    /// another login is running.
    pub async fn login(&self, phone: &str) -> Result<(), LoginError> {
        self.login_with_cancel(phone, CancellationToken::new()).await
    }

    /// Like `login`, aborting with `LoginError::Cancelled` when `cancel` fires.
    ///
    /// # Errors
    /// See `login`; additionally `LoginError::Cancelled`.
    pub async fn login_with_cancel(
        &self,
        phone: &str,
        cancel: CancellationToken,
    ) -> Result<(), LoginError> {
        self.hydrate();

        if self
            .login_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("rejecting concurrent login");
            return Err(LoginError::InFlight);
        }
        let _flight = InFlight { manager: self };

        // Child token: fires on the caller's cancel or on logout.
        let cancel = cancel.child_token();
        *self.active_login() = Some(cancel.clone());

        debug!(phone_len = phone.len(), "login started");
        self.state.send_modify(|s| s.activity = Activity::LoggingIn);

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LoginError::Cancelled),
            result = self.fetcher.fetch() => result.map_err(LoginError::from),
        };

        match fetched {
            Ok(user) => {
                let active = self.active_login();
                if cancel.is_cancelled() {
                    debug!("login cancelled after fetch; discarding record");
                    return Err(LoginError::Cancelled);
                }
                self.store.save(&user);
                info!(user_id = user.id(), "login succeeded");
                self.state.send_replace(SessionState::authenticated(user));
                drop(active);
                Ok(())
            }
            Err(err) => {
                warn!(error = %error_chain(&err), "login failed");
                // `_flight` restores `is_loading() == false` on drop.
                Err(err)
            }
        }
    }

    /// Clears the stored record and the session. Never fails.
    ///
    /// An in-flight login is cancelled and resolves to `LoginError::Cancelled`.
    pub fn logout(&self) {
        // A later hydrate must not resurrect the cleared session.
        self.hydration.call_once(|| {});

        let active = self.active_login();
        if let Some(cancel) = active.as_ref() {
            debug!("logout cancels in-flight login");
            cancel.cancel();
        }
        self.store.clear();
        self.state.send_replace(SessionState::anonymous());
        drop(active);
        info!("logged out");
    }

    fn active_login(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active_login
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets the in-flight flag and loading activity when a login ends,
/// including when its future is dropped mid-fetch.
struct InFlight<'a> {
    manager: &'a SessionManager,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.manager.active_login().take();
        self.manager.state.send_if_modified(|s| {
            if s.activity == Activity::LoggingIn {
                s.activity = Activity::Idle;
                true
            } else {
                false
            }
        });
        self.manager.login_in_flight.store(false, Ordering::Release);
    }
}
