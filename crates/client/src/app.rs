//! Application wiring: one explicitly constructed graph of shared services.

use std::sync::Arc;

use thiserror::Error;

use stockdesk_auth::{Principal, RegisterRequest};

use crate::config::ClientConfig;
use crate::http::ApiClient;
use crate::navigation::{History, Location, NavigationTicket, Navigator, post_login_destination};
use crate::routes::{MenuEntry, Page, Resolution, RouteTable};
use crate::services::{InventoryService, UserService};
use crate::session::{AuthError, SessionStore};
use crate::storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};

/// A page could not be shown to the current principal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("login required")]
    LoginRequired,

    #[error("{0}")]
    Forbidden(String),

    #[error("page not found: {0}")]
    NotFound(String),

    #[error("session not ready")]
    Pending,
}

#[derive(Debug, Clone)]
pub struct App {
    pub session: Arc<SessionStore>,
    pub history: Arc<History>,
    pub api: Arc<ApiClient>,
    pub inventory: InventoryService,
    pub users: UserService,
    pub routes: Arc<RouteTable>,
}

impl App {
    /// Build the graph from configuration and restore any persisted session.
    pub fn bootstrap(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let storage: Arc<dyn SessionStorage> = match &config.session_file {
            Some(path) => Arc::new(FileStorage::new(path)),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, reqwest::Error> {
        let session = Arc::new(SessionStore::new(storage));
        let history = Arc::new(History::new());
        let navigator: Arc<dyn Navigator> = history.clone();
        let api = Arc::new(ApiClient::new(config, session.clone(), navigator)?);

        session.restore_from_persistence();
        tracing::debug!(api_url = %config.api_url, "client ready");

        Ok(Self {
            inventory: InventoryService::new(api.clone()),
            users: UserService::new(api.clone()),
            routes: Arc::new(RouteTable::standard()),
            session,
            history,
            api,
        })
    }

    /// Log in, then move to the remembered location (default `/dashboard`).
    pub async fn login(&self, email: &str, password: &str) -> Result<(Principal, Location), AuthError> {
        let principal = self.session.login(self.api.as_ref(), email, password).await?;
        Ok((principal, self.after_login()))
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(Principal, Location), AuthError> {
        let principal = self.session.register(self.api.as_ref(), request).await?;
        Ok((principal, self.after_login()))
    }

    fn after_login(&self) -> Location {
        let destination = post_login_destination(self.history.take_login_redirect().as_ref());
        self.history.navigate(destination.clone());
        destination
    }

    /// Always ends on the login page; the error only reports that the
    /// persisted session could not be removed.
    pub fn logout(&self) -> Result<(), StorageError> {
        let cleared = self.session.logout();
        self.history.navigate(Location::login());
        cleared
    }

    /// Navigate to `location` and resolve what it shows.
    ///
    /// Login-required and redirect outcomes are applied to the history.
    pub fn open(&self, location: Location) -> Resolution {
        self.history.navigate(location.clone());
        let principal = self.session.current_principal();
        let resolution = self
            .routes
            .resolve(self.session.phase(), principal.as_ref(), &location);
        match &resolution {
            Resolution::LoginRequired { redirect } => {
                self.history.redirect_to_login(redirect.clone());
            }
            Resolution::Redirect { to } => self.history.navigate(to.clone()),
            _ => {}
        }
        resolution
    }

    /// Open a page and require that it renders.
    pub fn enter(&self, page: Page) -> Result<(), AccessError> {
        let path = self
            .routes
            .route_for(page)
            .map(|r| r.path)
            .ok_or_else(|| AccessError::NotFound(page.title().to_string()))?;
        match self.open(Location::parse(path)) {
            Resolution::Render { .. } | Resolution::Redirect { .. } => Ok(()),
            Resolution::Pending => Err(AccessError::Pending),
            Resolution::LoginRequired { .. } => Err(AccessError::LoginRequired),
            Resolution::Forbidden { message, .. } => Err(AccessError::Forbidden(message)),
            Resolution::NotFound { path } => Err(AccessError::NotFound(path)),
        }
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        self.routes.menu(self.session.current_principal().as_ref())
    }

    pub fn ticket(&self) -> NavigationTicket {
        self.history.ticket()
    }

    /// Drop a response that arrived after the user navigated away.
    pub fn if_current<T>(&self, ticket: NavigationTicket, value: T) -> Option<T> {
        if self.history.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!("discarding stale response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use stockdesk_auth::RoleName;

    use super::*;
    use crate::session::tests::principal;
    use crate::storage::{PRINCIPAL_SLOT, TOKEN_SLOT};

    fn app_with(principal: Option<Principal>) -> App {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(p) = principal {
            let json = serde_json::to_string(&p).unwrap();
            storage
                .set_pair((PRINCIPAL_SLOT, &json), (TOKEN_SLOT, "YTpi"))
                .unwrap();
        }
        App::with_storage(&ClientConfig::default(), storage).unwrap()
    }

    #[test]
    fn bootstrap_restores_persisted_session() {
        let app = app_with(Some(principal("m@x.com", "MANAGER")));
        assert!(app.session.has_role(RoleName::MANAGER.as_str()));
        assert!(app.enter(Page::Products).is_ok());
        assert!(matches!(app.enter(Page::Users), Err(AccessError::Forbidden(_))));
    }

    #[test]
    fn protected_page_sends_anonymous_user_to_login() {
        let app = app_with(None);
        assert_eq!(app.enter(Page::Dashboard), Err(AccessError::LoginRequired));
        assert!(app.history.current().is_login());
        let redirect = app.history.take_login_redirect().unwrap();
        assert_eq!(redirect.from, Location::parse("/dashboard"));
    }

    #[test]
    fn stale_responses_are_dropped() {
        let app = app_with(Some(principal("a@x.com", "ADMIN")));
        let ticket = app.ticket();
        assert_eq!(app.if_current(ticket, 1), Some(1));
        app.open(Location::parse("/products"));
        assert_eq!(app.if_current(ticket, 2), None);
    }

    #[test]
    fn logout_lands_on_login() {
        let app = app_with(Some(principal("a@x.com", "ADMIN")));
        app.logout().unwrap();
        assert!(app.session.current_principal().is_none());
        assert!(app.history.current().is_login());
        assert!(app.menu().is_empty());
    }
}
