//! Session store: the single source of truth for "who is logged in".
//!
//! A principal and its credential token are held together in one
//! [`Session`] value, so the store can only ever be fully logged in or fully
//! logged out. Every mutation writes both persisted slots (or removes both)
//! before the in-memory state changes hands.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use stockdesk_auth::{
    CredentialToken, LoginRequest, Principal, RegisterRequest, has_any_role, has_role,
};
use stockdesk_core::DomainError;

use crate::http::ApiError;
use crate::storage::{PRINCIPAL_SLOT, SessionStorage, StorageError, TOKEN_SLOT};

/// Remote endpoints the session store authenticates against.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /auth/login`; returns the server-supplied principal.
    async fn login(&self, request: &LoginRequest) -> Result<Principal, ApiError>;

    /// `POST /auth/register`.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;
}

/// Lifecycle phase. Route decisions are deferred while not `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Persisted session not yet loaded.
    Restoring,
    /// A login/registration request is in flight.
    Authenticating,
    Ready,
}

impl SessionPhase {
    pub fn is_pending(self) -> bool {
        !matches!(self, SessionPhase::Ready)
    }
}

/// An authenticated principal together with its credential token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    principal: Principal,
    token: CredentialToken,
}

impl Session {
    pub fn new(principal: Principal, token: CredentialToken) -> Self {
        Self { principal, token }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn token(&self) -> &CredentialToken {
        &self.token
    }
}

/// Published on every session change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub principal: Option<Principal>,
    /// Incremented on every change.
    pub revision: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Api(ApiError),

    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    session: Option<Session>,
    revision: u64,
    /// Set when clearing storage failed: whatever is still persisted belongs
    /// to a session that was logged out or rejected and must not come back.
    purge_pending: bool,
}

/// Explicitly constructed, shared (`Arc`) session store.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
    changes: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (changes, _) = watch::channel(SessionSnapshot {
            phase: SessionPhase::Restoring,
            principal: None,
            revision: 0,
        });
        Self {
            storage,
            state: RwLock::new(SessionState {
                phase: SessionPhase::Restoring,
                session: None,
                revision: 0,
                purge_pending: false,
            }),
            changes,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `mutate` and publish the resulting snapshot.
    fn transition<F>(&self, mutate: F)
    where
        F: FnOnce(&mut SessionState),
    {
        let snapshot = {
            let mut state = self.write();
            mutate(&mut state);
            state.revision += 1;
            SessionSnapshot {
                phase: state.phase,
                principal: state.session.as_ref().map(|s| s.principal.clone()),
                revision: state.revision,
            }
        };
        self.changes.send_replace(snapshot);
    }

    /// Load the persisted principal/token pair into memory without touching
    /// the network. Called once at startup.
    pub fn restore_from_persistence(&self) -> Option<Principal> {
        let restored = self.load_persisted();
        let principal = restored.as_ref().map(|s| s.principal.clone());
        match &principal {
            Some(p) => tracing::info!(principal = %p.id, role = %p.role.name, "session restored"),
            None => tracing::debug!("no persisted session"),
        }
        self.transition(|state| {
            state.session = restored;
            state.phase = SessionPhase::Ready;
        });
        principal
    }

    /// Authenticate against the API and establish a new session.
    ///
    /// Any previous session is replaced on success and cleared on failure.
    /// Validation failures are reported before any request is made and leave
    /// the current session untouched.
    pub async fn login<G>(
        &self,
        gateway: &G,
        identifier: &str,
        secret: &str,
    ) -> Result<Principal, AuthError>
    where
        G: AuthGateway + ?Sized,
    {
        let request = LoginRequest::new(identifier.trim(), secret);
        request.validate()?;
        self.authenticate(gateway, request).await
    }

    /// Register a new account, then log in with the same credentials.
    pub async fn register<G>(
        &self,
        gateway: &G,
        request: &RegisterRequest,
    ) -> Result<Principal, AuthError>
    where
        G: AuthGateway + ?Sized,
    {
        request.validate()?;
        self.set_phase(SessionPhase::Authenticating);
        if let Err(e) = gateway.register(request).await {
            tracing::warn!(email = %request.email, error = %e, "registration rejected");
            self.set_phase(SessionPhase::Ready);
            return Err(AuthError::Api(e));
        }
        tracing::info!(email = %request.email, "account registered");
        self.authenticate(gateway, request.login_request()).await
    }

    async fn authenticate<G>(&self, gateway: &G, request: LoginRequest) -> Result<Principal, AuthError>
    where
        G: AuthGateway + ?Sized,
    {
        self.set_phase(SessionPhase::Authenticating);

        let principal = match gateway.login(&request).await {
            Ok(principal) => principal,
            Err(e) => {
                let _ = self.clear();
                return Err(match e {
                    ApiError::Unauthorized => {
                        tracing::info!(email = %request.email, "login rejected");
                        AuthError::InvalidCredentials
                    }
                    other => {
                        tracing::warn!(email = %request.email, error = %other, "login failed");
                        AuthError::Api(other)
                    }
                });
            }
        };

        let session = Session::new(principal.clone(), request.token());
        if let Err(e) = self.persist(&session) {
            tracing::error!(error = %e, "failed to persist session; discarding it");
            let _ = self.clear();
            return Err(AuthError::Storage(e));
        }

        tracing::info!(principal = %principal.id, role = %principal.role.name, "logged in");
        self.transition(|state| {
            state.session = Some(session);
            state.phase = SessionPhase::Ready;
            state.purge_pending = false;
        });
        Ok(principal)
    }

    /// Clear the session in memory and in storage. Idempotent.
    ///
    /// The in-memory session is gone even when this returns an error; the
    /// error only reports that the persisted copy could not be removed. That
    /// copy is never rehydrated by this store, and removal is retried on the
    /// next read or mutation.
    pub fn logout(&self) -> Result<(), StorageError> {
        if self.read().session.is_some() {
            tracing::info!("logged out");
        }
        self.clear()
    }

    /// Tear down the session after the API rejected its credentials.
    pub fn expire(&self) {
        if self.read().session.is_some() {
            tracing::warn!("credentials rejected by API; session cleared");
        }
        let _ = self.clear();
    }

    fn clear(&self) -> Result<(), StorageError> {
        let purged = self.storage.remove_pair(PRINCIPAL_SLOT, TOKEN_SLOT);
        if let Err(e) = &purged {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.transition(|state| {
            state.session = None;
            state.phase = SessionPhase::Ready;
            state.purge_pending = purged.is_err();
        });
        purged
    }

    /// Retry a failed purge. Returns `true` while stale data may remain.
    fn retry_purge(&self) -> bool {
        if !self.read().purge_pending {
            return false;
        }
        match self.storage.remove_pair(PRINCIPAL_SLOT, TOKEN_SLOT) {
            Ok(()) => {
                tracing::info!("stale persisted session removed");
                self.write().purge_pending = false;
            }
            Err(e) => tracing::warn!(error = %e, "persisted session still not removed"),
        }
        true
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.transition(|state| state.phase = phase);
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let principal = serde_json::to_string(&session.principal)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set_pair(
            (PRINCIPAL_SLOT, &principal),
            (TOKEN_SLOT, session.token.expose()),
        )
    }

    /// Read the persisted pair. Anything short of a complete, well-formed
    /// pair is "no session"; a half-written or malformed pair is purged.
    fn load_persisted(&self) -> Option<Session> {
        if self.retry_purge() {
            return None;
        }
        let read = |key: &str| match self.storage.get(key) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(slot = key, error = %e, "failed to read persisted session");
                Err(())
            }
        };
        let (Ok(principal), Ok(token)) = (read(PRINCIPAL_SLOT), read(TOKEN_SLOT)) else {
            return None;
        };

        let parsed = match (principal, token) {
            (None, None) => return None,
            (Some(principal), Some(token)) => {
                let principal = serde_json::from_str::<Principal>(&principal)
                    .map_err(|e| e.to_string());
                let token = CredentialToken::from_encoded(token).map_err(|e| e.to_string());
                match (principal, token) {
                    (Ok(principal), Ok(token)) => Ok(Session::new(principal, token)),
                    (Err(e), _) | (_, Err(e)) => Err(e),
                }
            }
            _ => Err("incomplete principal/token pair".to_string()),
        };

        match parsed {
            Ok(session) => Some(session),
            Err(reason) => {
                tracing::warn!(%reason, "discarding persisted session");
                if let Err(e) = self.storage.remove_pair(PRINCIPAL_SLOT, TOKEN_SLOT) {
                    tracing::warn!(error = %e, "failed to purge persisted session");
                }
                None
            }
        }
    }

    /// Current principal: in-memory if set, otherwise rehydrated from storage.
    pub fn current_principal(&self) -> Option<Principal> {
        if let Some(session) = &self.read().session {
            return Some(session.principal.clone());
        }
        let restored = self.load_persisted()?;
        let principal = restored.principal.clone();
        self.transition(|state| {
            if state.session.is_none() {
                state.session = Some(restored);
            }
        });
        Some(principal)
    }

    /// Credential token of the current session, if any.
    pub fn token(&self) -> Option<CredentialToken> {
        self.read().session.as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_principal().is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().phase
    }

    pub fn has_role(&self, name: &str) -> bool {
        has_role(self.current_principal().as_ref(), name)
    }

    pub fn has_any_role<S: AsRef<str>>(&self, names: &[S]) -> bool {
        has_any_role(self.current_principal().as_ref(), names)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.changes.borrow().clone()
    }

    /// Receiver notified on every session change (login, logout, expiry, restore).
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.changes.subscribe()
    }
}
