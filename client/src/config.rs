//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `BOARD_*` environment variables, configuration files and
//! CLI arguments. Paging and timeout always carry a value; the remaining
//! fields are optional and fall back to a default.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_RESOURCE_PATH: &str = "/bulletin-board/posts";
const DEFAULT_AUTH_PATH: &str = "/auth";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

fn default_token_file() -> PathBuf {
    std::env::temp_dir().join("board-client").join("token")
}

/// Reasons the configured endpoints cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The base URL does not parse or cannot carry a path.
    #[error("invalid base URL {value:?}: {message}")]
    InvalidBaseUrl { value: String, message: String },
    /// A path does not join onto the base URL.
    #[error("invalid path {value:?}: {message}")]
    InvalidPath { value: String, message: String },
}

/// Endpoints, paging and session persistence for the client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOARD")]
pub struct ClientSettings {
    /// Scheme, host and port of the REST API.
    pub base_url: Option<String>,
    /// Path of the paginated resource below the base URL.
    pub resource_path: Option<String>,
    /// Path of the auth endpoints below the base URL.
    pub auth_path: Option<String>,
    /// Records requested per page.
    #[ortho_config(default = 10)]
    pub page_size: u32,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub timeout_seconds: u64,
    /// File holding the persisted bearer token.
    pub token_file: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            resource_path: None,
            auth_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            token_file: None,
        }
    }
}

impl ClientSettings {
    /// Return the configured base URL, falling back to the default.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Return the configured resource path, falling back to the default.
    pub fn resource_path(&self) -> &str {
        self.resource_path.as_deref().unwrap_or(DEFAULT_RESOURCE_PATH)
    }

    /// Return the configured auth path, falling back to the default.
    pub fn auth_path(&self) -> &str {
        self.auth_path.as_deref().unwrap_or(DEFAULT_AUTH_PATH)
    }

    /// Records per page, at least 1.
    pub fn page_size(&self) -> u32 {
        self.page_size.max(1)
    }

    /// Request timeout, at least one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// Return the configured token file, falling back to the default.
    pub fn token_file(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(default_token_file)
    }

    /// Absolute URL of the paginated resource.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the base URL or path is malformed.
    pub fn resource_url(&self) -> Result<Url, SettingsError> {
        self.join(self.resource_path())
    }

    /// Absolute URL of the auth endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the base URL or path is malformed.
    pub fn auth_url(&self) -> Result<Url, SettingsError> {
        self.join(self.auth_path())
    }

    // A leading slash on `path` is ignored so a base URL prefix survives.
    fn join(&self, path: &str) -> Result<Url, SettingsError> {
        let base_url = self.base_url();
        let mut base = Url::parse(base_url).map_err(|error| SettingsError::InvalidBaseUrl {
            value: base_url.to_owned(),
            message: error.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(SettingsError::InvalidBaseUrl {
                value: base_url.to_owned(),
                message: "URL cannot carry a path".to_owned(),
            });
        }
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|error| SettingsError::InvalidPath {
                value: path.to_owned(),
                message: error.to_string(),
            })
    }
}
