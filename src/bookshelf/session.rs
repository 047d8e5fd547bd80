//! # Session
//!
//! Who is signed in. The rest of the crate never reads the current user from
//! ambient state: callers ask the session once and pass the [`User`] down
//! explicitly to the operations that need it.
//!
//! Session changes are published on a `tokio::sync::watch` channel so the
//! event loop can stop, and drop its copy of the shelf, the moment the user
//! signs out.

use crate::backend::rest::RestBackend;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedIn(User),
    SignedOut,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            SessionState::SignedOut => None,
        }
    }
}

#[async_trait]
pub trait AuthSession: Send + Sync {
    fn current_user(&self) -> Option<User>;

    async fn sign_out(&self) -> Result<()>;

    /// Receive every subsequent session change.
    fn subscribe(&self) -> watch::Receiver<SessionState>;
}

/// Session backed by a watch channel, optionally tied to a remote auth service.
pub struct SessionHandle {
    state: watch::Sender<SessionState>,
    remote: Option<(Arc<RestBackend>, String)>,
}

impl SessionHandle {
    pub fn signed_out() -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self {
            state,
            remote: None,
        }
    }

    pub fn signed_in(user: User) -> Self {
        let (state, _) = watch::channel(SessionState::SignedIn(user));
        Self {
            state,
            remote: None,
        }
    }

    /// Revoke `access_token` with the backend's auth service on sign-out.
    pub fn with_remote(mut self, backend: Arc<RestBackend>, access_token: String) -> Self {
        self.remote = Some((backend, access_token));
        self
    }

    pub fn sign_in(&self, user: User) {
        info!(user_id = %user.id, "signed in");
        self.state.send_replace(SessionState::SignedIn(user));
    }
}

#[async_trait]
impl AuthSession for SessionHandle {
    fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some((backend, token)) = &self.remote {
            // Local sign-out happens regardless; a stale remote token simply expires.
            if let Err(e) = backend.sign_out(token).await {
                warn!(error = %e, "remote sign-out failed");
            }
        }
        self.state.send_replace(SessionState::SignedOut);
        info!("signed out");
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

/// The signed-in user, or [`ShelfError::NotSignedIn`](crate::error::ShelfError::NotSignedIn).
pub fn require_user<A: AuthSession + ?Sized>(session: &A) -> Result<User> {
    session
        .current_user()
        .ok_or(crate::error::ShelfError::NotSignedIn)
}
