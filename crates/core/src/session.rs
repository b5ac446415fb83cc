//! Lazily-established, process-wide Slack session.
//!
//! A [`SessionProvider`] owns the one authenticated handle the bridge uses.
//! The first resolver runs the injected [`Authenticator`]; concurrent
//! resolvers wait on that same bootstrap instead of starting their own, and
//! every later call gets the cached [`Session`] without re-validating.

use crate::error::{BridgeError, BridgeResult};
use crate::types::ConversationsApi;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Whether a session talks to Slack or to the local demo fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Live,
    Demo,
}

/// Who the session is authenticated as, as reported by `auth.test`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub team: String,
    pub team_id: String,
    pub user: String,
    pub user_id: String,
    pub url: String,
}

/// Authenticated handle to the upstream API. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    api: Arc<dyn ConversationsApi>,
    identity: SessionIdentity,
    mode: SessionMode,
    established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(api: Arc<dyn ConversationsApi>, identity: SessionIdentity, mode: SessionMode) -> Self {
        Self {
            api,
            identity,
            mode,
            established_at: Utc::now(),
        }
    }

    pub fn api(&self) -> &dyn ConversationsApi {
        self.api.as_ref()
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("mode", &self.mode)
            .field("established_at", &self.established_at)
            .finish_non_exhaustive()
    }
}

/// Strategy that turns configured credentials into a [`Session`]
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Validate credentials and perform the upstream handshake
    async fn authenticate(&self) -> BridgeResult<Session>;
}

/// Single-flight accessor for the process-wide session
pub struct SessionProvider {
    authenticator: Arc<dyn Authenticator>,
    session: OnceCell<Session>,
    bootstrap_wait: Duration,
}

impl SessionProvider {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            session: OnceCell::new(),
            bootstrap_wait: Duration::from_secs(30),
        }
    }

    /// How long a tool call waits for an in-progress bootstrap before
    /// failing with [`BridgeError::NotReady`]
    pub fn with_bootstrap_wait(mut self, wait: Duration) -> Self {
        self.bootstrap_wait = wait;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.session.initialized()
    }

    /// The established session, if bootstrap has completed
    pub fn current(&self) -> Option<&Session> {
        self.session.get()
    }

    /// Run (or join) the bootstrap with no deadline.
    ///
    /// Used by the background boot task. A failed bootstrap is not cached.
    pub async fn bootstrap(&self) -> BridgeResult<Session> {
        self.session
            .get_or_try_init(|| async {
                tracing::info!("Booting Slack session...");
                let session = self.authenticator.authenticate().await?;
                tracing::info!(
                    team = %session.identity().team,
                    user = %session.identity().user,
                    mode = ?session.mode(),
                    "Slack session booted successfully"
                );
                Ok(session)
            })
            .await
            .cloned()
    }

    /// Resolve the session for a tool call.
    ///
    /// Returns the cached session immediately when present. Otherwise waits
    /// on the shared bootstrap for at most the configured bootstrap wait, or
    /// until `cancel` fires. The bootstrap runs on its own task, so a caller
    /// that gives up does not abort it.
    pub async fn resolve(self: &Arc<Self>, cancel: &CancellationToken) -> BridgeResult<Session> {
        if let Some(session) = self.session.get() {
            return Ok(session.clone());
        }

        let provider = Arc::clone(self);
        let boot = tokio::spawn(async move { provider.bootstrap().await });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Cancelled while waiting for Slack session");
                Err(BridgeError::Cancelled)
            }
            joined = boot => match joined {
                Ok(result) => result,
                Err(e) => Err(BridgeError::Upstream {
                    page: 0,
                    source: Box::new(e),
                }),
            },
            _ = tokio::time::sleep(self.bootstrap_wait) => Err(BridgeError::NotReady {
                waited_secs: self.bootstrap_wait.as_secs(),
            }),
        }
    }
}
