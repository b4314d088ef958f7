//! Bearer session holder.
//!
//! [`SessionHandle`] is the request context the HTTP adapters consult on
//! every call, so the `Authorization` header always reflects the current
//! token and nothing survives a logout. [`SessionService`] drives the
//! handle through login, registration, logout and hydration.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::LoginCredentials;
use crate::domain::ports::{AuthService, RequestError, TokenStore, TokenStoreError};

/// Reasons a raw string is not a usable bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenValidationError {
    /// The token was empty once trimmed.
    #[error("token must not be empty")]
    Empty,
    /// The token contains whitespace or control characters.
    #[error("token must not contain whitespace or control characters")]
    InvalidCharacters,
}

/// Opaque credential sent as `Authorization: Bearer <token>`.
///
/// ## Invariants
/// - Non-empty, free of whitespace and control characters, so it is always a
///   valid header value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

impl BearerToken {
    /// Validate and wrap a raw token, trimming surrounding whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenValidationError> {
        let raw = Zeroizing::new(raw.into());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TokenValidationError::Empty);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(TokenValidationError::InvalidCharacters);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// The raw token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Value for the `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.as_str())
    }

    /// Expiry instant taken from the `exp` claim when the token is a JWT.
    ///
    /// Opaque tokens and JWTs without a readable `exp` claim yield `None`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut segments = self.as_str().split('.');
        let (_header, payload) = (segments.next()?, segments.next()?);
        segments.next()?;
        let decoded = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let claim: ExpiryClaim = serde_json::from_slice(&decoded).ok()?;
        DateTime::from_timestamp(claim.exp?, 0)
    }

    /// Return whether the token's `exp` claim lies strictly before `now`.
    ///
    /// A token is still usable during its `exp` second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| expiry < now)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Shared, always-current view of the session token.
///
/// Cloning is cheap; every clone observes the same token. Only
/// [`SessionService`] writes to it.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    token: Arc<RwLock<Option<BearerToken>>>,
}

impl SessionHandle {
    /// Current token, if logged in.
    pub fn token(&self) -> Option<BearerToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Derived from the token; never stored separately.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// `Authorization` header value for the next request, if logged in.
    pub fn authorization(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(BearerToken::authorization_value)
    }

    /// Return whether the current token carries an `exp` claim in the past.
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| token.is_expired_at(clock.utc()))
    }

    fn install(&self, token: BearerToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Failures surfaced by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The authentication service call failed.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// The token could not be persisted or read back.
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// Result of restoring a persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// A persisted token was installed.
    Restored,
    /// Nothing was persisted.
    NoToken,
    /// The persisted token had expired and was discarded.
    Expired,
}

/// Drives a [`SessionHandle`] through the login lifecycle.
///
/// `LoggedOut --login--> LoggedIn --logout--> LoggedOut`, plus
/// `LoggedOut --hydrate--> LoggedIn` when a live token was persisted.
pub struct SessionService<A, S> {
    auth: Arc<A>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    handle: SessionHandle,
}

impl<A, S> SessionService<A, S>
where
    A: AuthService,
    S: TokenStore,
{
    /// Create a logged-out session.
    pub fn new(auth: Arc<A>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            auth,
            store,
            clock,
            handle: SessionHandle::default(),
        }
    }

    /// Handle to pass into outbound adapters.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Shortcut for [`SessionHandle::is_authenticated`].
    pub fn is_authenticated(&self) -> bool {
        self.handle.is_authenticated()
    }

    /// Log in and start attaching the returned token to requests.
    ///
    /// The token is persisted before it is installed, so on any failure the
    /// session is exactly as it was.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), SessionError> {
        let grant = self.auth.login(credentials).await?;
        self.store.save(&grant.token)?;
        self.handle.install(grant.token);
        info!(
            token_type = %grant.token_type,
            expires_in = ?grant.expires_in,
            "session started"
        );
        Ok(())
    }

    /// Register an account. Registration does not log in.
    pub async fn register(&self, credentials: &LoginCredentials) -> Result<(), SessionError> {
        self.auth.register(credentials).await?;
        info!("account registered");
        Ok(())
    }

    /// Forget the token locally and in the store.
    ///
    /// The in-memory token is always cleared, even when the store fails.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.handle.clear();
        self.store.clear()?;
        info!("session ended");
        Ok(())
    }

    /// Restore a persisted token without asking the server.
    ///
    /// A token whose `exp` claim has passed is dropped from the store
    /// instead; any other staleness only shows on the next failing request.
    pub fn hydrate(&self) -> Result<HydrateOutcome, SessionError> {
        let Some(token) = self.store.load()? else {
            return Ok(HydrateOutcome::NoToken);
        };
        if token.is_expired_at(self.clock.utc()) {
            warn!("persisted token expired; discarding");
            self.store.clear()?;
            return Ok(HydrateOutcome::Expired);
        }
        self.handle.install(token);
        info!("session restored");
        Ok(HydrateOutcome::Restored)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
