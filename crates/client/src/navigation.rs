//! Navigation surface: current location, redirects, and stale-response tickets.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Login entry point.
pub const LOGIN_PATH: &str = "/auth";

/// Landing page after login when there is nothing to return to.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// A navigable location (`path` plus optional query string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Location {
    /// Parse `"/products?search=x"`. A missing leading slash is added and a
    /// trailing slash (other than the root) is dropped.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string()).filter(|q| !q.is_empty())),
            None => (raw, None),
        };
        let mut path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Self { path, query }
    }

    pub fn login() -> Self {
        Self::parse(LOGIN_PATH)
    }

    pub fn dashboard() -> Self {
        Self::parse(DASHBOARD_PATH)
    }

    pub fn is_login(&self) -> bool {
        self.path == LOGIN_PATH
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.query {
            Some(q) => write!(f, "{}?{}", self.path, q),
            None => f.write_str(&self.path),
        }
    }
}

/// Redirect to the login entry point that remembers where the user was going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRedirect {
    pub to: Location,
    pub from: Location,
}

impl LoginRedirect {
    pub fn new(from: Location) -> Self {
        Self {
            to: Location::login(),
            from,
        }
    }

    /// Where to go after a successful login.
    pub fn return_location(&self) -> Location {
        post_login_destination(Some(self))
    }
}

/// Destination after login: the remembered location, unless it is missing or
/// the login page itself.
pub fn post_login_destination(redirect: Option<&LoginRedirect>) -> Location {
    match redirect {
        Some(r) if !r.from.is_login() => r.from.clone(),
        _ => Location::dashboard(),
    }
}

/// Snapshot of the navigation epoch taken before an async operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket(u64);

/// Reads and writes the current location.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Location;

    fn navigate(&self, to: Location);

    /// Replace the current location with the login entry point, remembering
    /// the current location for post-login return.
    fn redirect_to_login(&self, redirect: LoginRedirect);

    /// Remembered redirect, consumed by the login flow.
    fn take_login_redirect(&self) -> Option<LoginRedirect>;

    fn ticket(&self) -> NavigationTicket;

    /// `false` once the user navigated after `ticket` was taken; responses
    /// for that navigation should be dropped.
    fn is_current(&self, ticket: NavigationTicket) -> bool {
        self.ticket() == ticket
    }
}

#[derive(Debug)]
struct HistoryState {
    entries: Vec<Location>,
    pending_redirect: Option<LoginRedirect>,
    epoch: u64,
}

/// In-process navigation history.
#[derive(Debug)]
pub struct History {
    state: RwLock<HistoryState>,
}

impl Default for History {
    fn default() -> Self {
        Self::starting_at(Location::parse("/"))
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(location: Location) -> Self {
        Self {
            state: RwLock::new(HistoryState {
                entries: vec![location],
                pending_redirect: None,
                epoch: 0,
            }),
        }
    }

    pub fn entries(&self) -> Vec<Location> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    fn push(state: &mut HistoryState, to: Location, replace: bool) {
        if replace {
            state.entries.pop();
        }
        state.entries.push(to);
        state.epoch += 1;
    }
}

impl Navigator for History {
    fn current(&self) -> Location {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .entries
            .last()
            .cloned()
            .unwrap_or_else(|| Location::parse("/"))
    }

    fn navigate(&self, to: Location) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(to = %to, "navigate");
        Self::push(&mut state, to, false);
    }

    fn redirect_to_login(&self, redirect: LoginRedirect) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = %redirect.from, "redirecting to login");
        let to = redirect.to.clone();
        // Re-redirecting from the login page must not forget the original target.
        if !(redirect.from.is_login() && state.pending_redirect.is_some()) {
            state.pending_redirect = Some(redirect);
        }
        Self::push(&mut state, to, true);
    }

    fn take_login_redirect(&self) -> Option<LoginRedirect> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pending_redirect
            .take()
    }

    fn ticket(&self) -> NavigationTicket {
        NavigationTicket(self.state.read().unwrap_or_else(PoisonError::into_inner).epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parsing_normalizes() {
        let loc = Location::parse("products/?search=drill");
        assert_eq!(loc.path, "/products");
        assert_eq!(loc.query.as_deref(), Some("search=drill"));
        assert_eq!(loc.to_string(), "/products?search=drill");
        assert_eq!(Location::parse("/").path, "/");
        assert_eq!(Location::parse("/users?").query, None);
    }

    #[test]
    fn redirect_preserves_attempted_location() {
        let history = History::starting_at(Location::parse("/products?page=2"));
        let from = history.current();
        history.redirect_to_login(LoginRedirect::new(from.clone()));

        assert!(history.current().is_login());
        // Redirects replace the protected entry rather than stacking on it.
        assert_eq!(history.entries().len(), 1);

        let redirect = history.take_login_redirect().unwrap();
        assert_eq!(redirect.return_location(), from);
        assert!(history.take_login_redirect().is_none());
    }

    #[test]
    fn post_login_defaults_to_dashboard() {
        assert_eq!(post_login_destination(None), Location::dashboard());
        let from_login = LoginRedirect::new(Location::login());
        assert_eq!(from_login.return_location(), Location::dashboard());
    }

    #[test]
    fn second_redirect_from_login_keeps_original_target() {
        let history = History::starting_at(Location::parse("/users"));
        history.redirect_to_login(LoginRedirect::new(history.current()));
        history.redirect_to_login(LoginRedirect::new(history.current()));
        assert_eq!(
            history.take_login_redirect().unwrap().from,
            Location::parse("/users")
        );
    }

    #[test]
    fn tickets_go_stale_after_navigation() {
        let history = History::new();
        let ticket = history.ticket();
        assert!(history.is_current(ticket));
        history.navigate(Location::parse("/products"));
        assert!(!history.is_current(ticket));
    }
}
