//! DTOs for the authentication endpoints.
//!
//! Login answers with `{access_token, token_type, expires_in}`; deployments
//! disagree on whether `expires_in` is a number or a numeric string, so both
//! are accepted.

use serde::{Deserialize, Serialize};

use crate::domain::ports::AccessGrant;
use crate::domain::{BearerToken, LoginCredentials};

#[derive(Debug, Serialize)]
pub(super) struct CredentialsDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for CredentialsDto<'a> {
    fn from(credentials: &'a LoginCredentials) -> Self {
        Self {
            email: credentials.email(),
            password: credentials.password(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AccessTokenDto {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<ExpiresInDto>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresInDto {
    Seconds(u64),
    Text(String),
}

impl ExpiresInDto {
    fn seconds(self) -> Result<u64, String> {
        match self {
            Self::Seconds(seconds) => Ok(seconds),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("expires_in {text:?} is not a number of seconds")),
        }
    }
}

impl AccessTokenDto {
    pub(super) fn into_grant(self) -> Result<AccessGrant, String> {
        let token = BearerToken::new(self.access_token)
            .map_err(|error| format!("access_token rejected: {error}"))?;
        let expires_in = self.expires_in.map(ExpiresInDto::seconds).transpose()?;
        Ok(AccessGrant {
            token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_owned()),
            expires_in,
        })
    }
}
