//! Route guards.
//!
//! A guard is a pure function of a `SessionState` plus its redirect target.
//! Navigation is only ever decided once the session has settled
//! (`is_loading() == false`).

use std::fmt;

use tracing::debug;

use crate::config::RoutesConfig;
use crate::session::SessionState;

/// A screen location such as `/auth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route(String);

impl Route {
    /// Default entry (login) route.
    pub const AUTH: &str = "/auth";
    /// Default protected (dashboard) route.
    pub const DASHBOARD: &str = "/dashboard";

    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Route {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Only authenticated viewers may stay.
    Protected,
    /// Only anonymous viewers may stay.
    Entry,
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not settled; show a placeholder, do not navigate.
    Pending,
    /// Show the route's content.
    Render,
    /// Navigate to the given route instead.
    Redirect(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    kind: GuardKind,
    redirect_to: Route,
}

impl RouteGuard {
    /// Guard for protected content; anonymous viewers go to `entry`.
    pub fn protected(entry: Route) -> Self {
        Self {
            kind: GuardKind::Protected,
            redirect_to: entry,
        }
    }

    /// Guard for the entry screen; authenticated viewers go to `protected`.
    pub fn entry(protected: Route) -> Self {
        Self {
            kind: GuardKind::Entry,
            redirect_to: protected,
        }
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    pub fn redirect_to(&self) -> &Route {
        &self.redirect_to
    }

    pub fn decide(&self, state: &SessionState) -> GuardDecision {
        match self.kind {
            GuardKind::Protected => {
                if state.is_loading() {
                    GuardDecision::Pending
                } else if state.is_authenticated() {
                    GuardDecision::Render
                } else {
                    GuardDecision::Redirect(self.redirect_to.clone())
                }
            }
            // The entry form stays visible while a login is in flight.
            GuardKind::Entry => {
                if !state.is_loading() && state.is_authenticated() {
                    GuardDecision::Redirect(self.redirect_to.clone())
                } else {
                    GuardDecision::Render
                }
            }
        }
    }
}

/// A redirect applied by `Router::sync`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub from: Route,
    pub to: Route,
}

/// Tracks the current route and applies guard redirects.
#[derive(Debug, Clone)]
pub struct Router {
    current: Route,
    entry: Route,
    protected: Route,
}

impl Router {
    /// Creates a router positioned at `initial`.
    pub fn new(routes: &RoutesConfig, initial: Route) -> Self {
        Self {
            current: initial,
            entry: routes.entry_route(),
            protected: routes.protected_route(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    pub fn entry(&self) -> &Route {
        &self.entry
    }

    pub fn protected(&self) -> &Route {
        &self.protected
    }

    /// Guard attached to `route`, if any.
    pub fn guard_for(&self, route: &Route) -> Option<RouteGuard> {
        if *route == self.protected {
            Some(RouteGuard::protected(self.entry.clone()))
        } else if *route == self.entry {
            Some(RouteGuard::entry(self.protected.clone()))
        } else {
            None
        }
    }

    /// Decision for the current route. Unguarded routes always render.
    pub fn decide(&self, state: &SessionState) -> GuardDecision {
        self.guard_for(&self.current)
            .map_or(GuardDecision::Render, |guard| guard.decide(state))
    }

    /// Moves to `route` unconditionally.
    pub fn navigate(&mut self, route: Route) {
        self.current = route;
    }

    /// Applies the current route's redirect, if any.
    ///
    /// The two guards redirect on complementary conditions, so after one
    /// redirect the target route renders for the same state.
    pub fn sync(&mut self, state: &SessionState) -> Option<Navigation> {
        match self.decide(state) {
            GuardDecision::Redirect(to) => {
                let from = std::mem::replace(&mut self.current, to.clone());
                debug!(from = %from, to = %to, "guard redirect");
                Some(Navigation { from, to })
            }
            GuardDecision::Pending | GuardDecision::Render => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchCause, FetchFailure, UserFetcher};
    use crate::session::SessionManager;
    use crate::storage::{MemoryStorage, UserRecordStore};
    use crate::user::UserRecord;
    use crate::user::test_support::jane_doe;

    struct NoFetch;

    #[async_trait::async_trait]
    impl UserFetcher for NoFetch {
        async fn fetch(&self) -> Result<UserRecord, FetchFailure> {
            Err(FetchFailure::new(FetchCause::EmptyResults))
        }
    }

    fn router_at(path: &str) -> Router {
        Router::new(&RoutesConfig::default(), Route::new(path))
    }

    #[test]
    fn test_protected_guard_waits_while_loading() {
        let guard = RouteGuard::protected(Route::new(Route::AUTH));
        assert_eq!(guard.decide(&SessionState::initial()), GuardDecision::Pending);
    }

    #[test]
    fn test_protected_guard_redirects_anonymous() {
        let guard = RouteGuard::protected(Route::new(Route::AUTH));
        assert_eq!(
            guard.decide(&SessionState::anonymous()),
            GuardDecision::Redirect(Route::new("/auth"))
        );
    }

    #[test]
    fn test_protected_guard_renders_authenticated() {
        let guard = RouteGuard::protected(Route::new(Route::AUTH));
        assert_eq!(
            guard.decide(&SessionState::authenticated(jane_doe())),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_entry_guard_redirects_only_when_settled_and_authenticated() {
        let guard = RouteGuard::entry(Route::new(Route::DASHBOARD));
        assert_eq!(guard.decide(&SessionState::initial()), GuardDecision::Render);
        assert_eq!(guard.decide(&SessionState::anonymous()), GuardDecision::Render);
        assert_eq!(
            guard.decide(&SessionState::authenticated(jane_doe())),
            GuardDecision::Redirect(Route::new("/dashboard"))
        );
    }

    #[test]
    fn test_unguarded_route_always_renders() {
        let mut router = router_at("/about");
        assert_eq!(router.decide(&SessionState::initial()), GuardDecision::Render);
        assert_eq!(router.sync(&SessionState::anonymous()), None);
        assert_eq!(router.current(), "/about");
    }

    #[test]
    fn test_router_uses_configured_routes() {
        let routes = RoutesConfig {
            entry: "/login".to_string(),
            protected: "/home".to_string(),
        };
        let mut router = Router::new(&routes, Route::new("/home"));

        let nav = router.sync(&SessionState::anonymous()).unwrap();
        assert_eq!(nav.from, Route::new("/home"));
        assert_eq!(nav.to, Route::new("/login"));
        assert_eq!(router.entry(), "/login");
        assert_eq!(router.protected(), "/home");
    }

    #[test]
    fn test_protected_route_redirects_exactly_once_after_settling() {
        let mut router = router_at(Route::DASHBOARD);

        assert_eq!(router.sync(&SessionState::initial()), None);
        assert_eq!(router.current(), "/dashboard");

        let settled = SessionState::anonymous();
        assert_eq!(
            router.sync(&settled),
            Some(Navigation {
                from: Route::new("/dashboard"),
                to: Route::new("/auth"),
            })
        );
        assert_eq!(router.sync(&settled), None);
        assert_eq!(router.current(), "/auth");
    }

    #[test]
    fn test_scenario_fresh_process_lands_on_entry() {
        let manager = SessionManager::new(
            UserRecordStore::new(MemoryStorage::new(), "auth_user"),
            NoFetch,
        );
        let mut router = router_at(Route::DASHBOARD);

        assert_eq!(router.decide(&manager.state()), GuardDecision::Pending);
        assert_eq!(router.sync(&manager.state()), None);

        let state = manager.hydrate();
        assert!(router.sync(&state).is_some());
        assert_eq!(router.current(), "/auth");
        assert_eq!(router.decide(&state), GuardDecision::Render);
    }

    #[test]
    fn test_scenario_stored_record_lands_on_dashboard() {
        let store = UserRecordStore::new(MemoryStorage::new(), "auth_user");
        store.save(&jane_doe());
        let manager = SessionManager::new(store, NoFetch);
        let mut router = router_at(Route::AUTH);

        assert_eq!(router.sync(&manager.state()), None);
        assert_eq!(router.current(), "/auth");

        let state = manager.hydrate();
        assert!(router.sync(&state).is_some());
        assert_eq!(router.current(), "/dashboard");
        assert_eq!(router.decide(&state), GuardDecision::Render);
        assert_eq!(state.user().map(UserRecord::full_name).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_logout_on_dashboard_redirects_to_entry() {
        let mut router = router_at(Route::DASHBOARD);
        assert_eq!(router.sync(&SessionState::authenticated(jane_doe())), None);

        assert!(router.sync(&SessionState::anonymous()).is_some());
        assert_eq!(router.current(), "/auth");
    }
}
