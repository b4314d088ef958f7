//! Reqwest-backed [`AuthService`].

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::dto::{AccessTokenDto, CredentialsDto};
use super::{HttpTransport, decode, join_segments};
use crate::domain::LoginCredentials;
use crate::domain::ports::{AccessGrant, AuthService, RequestError};

/// Auth endpoints below one URL: `{auth}/login` and `{auth}/register`.
pub struct HttpAuthService {
    transport: HttpTransport,
    auth_url: Url,
}

impl HttpAuthService {
    /// Address the auth endpoints below `auth_url` through `transport`.
    pub fn new(transport: HttpTransport, auth_url: Url) -> Self {
        Self {
            transport,
            auth_url,
        }
    }

    fn endpoint(&self, name: &str) -> Result<Url, RequestError> {
        join_segments(&self.auth_url, [name])
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessGrant, RequestError> {
        let request = self
            .transport
            .client()
            .post(self.endpoint("login")?)
            .json(&CredentialsDto::from(credentials));
        let body = self.transport.send(request, StatusCode::OK).await?;
        let dto: AccessTokenDto = decode(&body, "login")?;
        let grant = dto.into_grant().map_err(RequestError::decode)?;
        debug!(expires_in = ?grant.expires_in, "login granted");
        Ok(grant)
    }

    async fn register(&self, credentials: &LoginCredentials) -> Result<(), RequestError> {
        let request = self
            .transport
            .client()
            .post(self.endpoint("register")?)
            .json(&CredentialsDto::from(credentials));
        self.transport.send(request, StatusCode::CREATED).await?;
        Ok(())
    }
}
