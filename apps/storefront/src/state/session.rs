//! # Session State
//!
//! The signed-in reader and their tokens.
//!
//! ## Token Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Access Token Lifecycle                               │
//! │                                                                         │
//! │  login ──► AuthSession ──► memory + `session` table                    │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  access_token()                                                         │
//! │     ├── more than 5 min left ─────────────────────► cached token       │
//! │     └── within 5 min of expiry                                          │
//! │           ├── refresh ok ────────► store new session ► new token       │
//! │           └── refresh failed                                            │
//! │                 ├── not yet expired ──────────────► old token          │
//! │                 └── expired ──► clear session ───► NotAuthenticated    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! `RwLock` so concurrent pages can read the token together; a refresh
//! takes the write lock and re-checks, so only one refresh happens.

use std::sync::Arc;

use readnest_core::{CoreError, User};
use readnest_db::{Database, StoredSession};
use readnest_remote::{AuthClient, AuthSession, RowStoreClient, SignUpOutcome};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Result of a registration.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Registration {
    /// The account was created and the reader is signed in.
    SignedIn { user: User },
    /// The account must be confirmed by email before signing in.
    ConfirmationRequired { email: String },
}

fn to_stored(session: &AuthSession) -> StoredSession {
    StoredSession {
        user: session.user.clone(),
        access_token: session.access_token.clone(),
        refresh_token: session.refresh_token.clone(),
        expires_at: session.expires_at,
    }
}

fn from_stored(stored: StoredSession) -> AuthSession {
    AuthSession {
        access_token: stored.access_token,
        refresh_token: stored.refresh_token,
        expires_at: stored.expires_at,
        user: stored.user,
    }
}

/// Shared session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SessionState {
    /// Creates a signed-out session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the saved session from the local store.
    pub async fn restore(&self, db: &Database) -> Result<(), ApiError> {
        let stored = db.session().load().await?;
        if let Some(stored) = &stored {
            debug!(user_id = %stored.user.id, "Restored session");
        }
        *self.inner.write().await = stored.map(from_stored);
        Ok(())
    }

    /// Signs in and persists the session.
    ///
    /// The attempt is recorded in `login_attempts` (email and outcome only);
    /// a failure to record it never blocks the sign-in.
    pub async fn login(
        &self,
        auth: &AuthClient,
        store: &RowStoreClient,
        db: &Database,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let result = auth.sign_in_with_password(email, password).await;

        if let Err(e) = store.record_login_attempt(email, result.is_ok()).await {
            warn!(error = %e, "Could not record login attempt");
        }

        let session = result?;
        self.set(db, session).await
    }

    /// Creates an account; signs in immediately when the BaaS allows it.
    pub async fn register(
        &self,
        auth: &AuthClient,
        db: &Database,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, ApiError> {
        match auth.sign_up(name, email, password).await? {
            SignUpOutcome::SignedIn(session) => {
                let user = self.set(db, session).await?;
                Ok(Registration::SignedIn { user })
            }
            SignUpOutcome::ConfirmationRequired { email } => {
                info!(email = %email, "Account awaiting confirmation");
                Ok(Registration::ConfirmationRequired { email })
            }
        }
    }

    /// Signs out. The local session is cleared even if the server call fails.
    pub async fn logout(&self, auth: &AuthClient, db: &Database) -> Result<(), ApiError> {
        let session = self.inner.write().await.take();

        if let Some(session) = session {
            if let Err(e) = auth.sign_out(&session.access_token).await {
                warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
            }
        }

        db.session().clear().await?;
        Ok(())
    }

    /// The signed-in reader, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }

    /// The signed-in reader, or `NotAuthenticated` naming what they tried to do.
    pub async fn require_user(&self, action: &str) -> Result<User, ApiError> {
        self.current_user()
            .await
            .ok_or_else(|| CoreError::not_authenticated(action).into())
    }

    /// Replaces the cached account details (name changes made elsewhere).
    pub async fn update_user(&self, db: &Database, user: User) -> Result<(), ApiError> {
        let stored = {
            let mut guard = self.inner.write().await;
            let Some(session) = guard.as_mut() else {
                return Ok(());
            };
            session.user = user;
            to_stored(session)
        };
        db.session().save(&stored).await?;
        Ok(())
    }

    /// Returns a usable access token, refreshing it when close to expiry.
    pub async fn access_token(
        &self,
        auth: &AuthClient,
        db: &Database,
        action: &str,
    ) -> Result<String, ApiError> {
        // Fast path: read lock
        {
            let guard = self.inner.read().await;
            match guard.as_ref() {
                None => return Err(CoreError::not_authenticated(action).into()),
                Some(session) if !session.needs_refresh() => {
                    return Ok(session.access_token.clone());
                }
                Some(_) => {}
            }
        }

        let mut guard = self.inner.write().await;

        // Another page may have refreshed while we waited for the write lock
        let (refresh_token, current_token, expired) = match guard.as_ref() {
            None => return Err(CoreError::not_authenticated(action).into()),
            Some(session) if !session.needs_refresh() => {
                return Ok(session.access_token.clone());
            }
            Some(session) => (
                session.refresh_token.clone(),
                session.access_token.clone(),
                session.is_expired(),
            ),
        };

        debug!("Access token close to expiry, refreshing");
        match auth.refresh(&refresh_token).await {
            Ok(fresh) => {
                db.session().save(&to_stored(&fresh)).await?;
                let token = fresh.access_token.clone();
                *guard = Some(fresh);
                info!("Access token refreshed");
                Ok(token)
            }
            Err(e) if !expired => {
                warn!(error = %e, "Token refresh failed, using current token");
                Ok(current_token)
            }
            Err(e) => {
                warn!(error = %e, "Session expired and could not be refreshed");
                *guard = None;
                db.session().clear().await?;
                Err(CoreError::not_authenticated(action).into())
            }
        }
    }

    async fn set(&self, db: &Database, session: AuthSession) -> Result<User, ApiError> {
        db.session().save(&to_stored(&session)).await?;
        let user = session.user.clone();
        *self.inner.write().await = Some(session);
        Ok(user)
    }
}
