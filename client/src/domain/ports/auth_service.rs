//! Driven port for the remote authentication service.

use async_trait::async_trait;

use super::RequestError;
use crate::domain::{BearerToken, LoginCredentials};

/// Token grant returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// Token to send as `Authorization: Bearer <token>`.
    pub token: BearerToken,
    /// Token type reported by the server, usually `Bearer`.
    pub token_type: String,
    /// Lifetime in seconds, when the server reports one.
    pub expires_in: Option<u64>,
}

/// Port for logging in and registering against the auth service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a token (`POST {auth}/login`, expects 200).
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessGrant, RequestError>;

    /// Create an account (`POST {auth}/register`, expects 201).
    async fn register(&self, credentials: &LoginCredentials) -> Result<(), RequestError>;
}
