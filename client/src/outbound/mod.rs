//! Outbound adapters implementing domain ports.
//!
//! - **http**: reqwest-backed resource client and auth service.
//! - **token_file**: capability-scoped file store for the bearer token.
//!
//! Adapters are thin translators between domain types and the wire or the
//! filesystem. They contain no business logic.

pub mod http;
pub mod token_file;

pub use http::{HttpAuthService, HttpResourceClient, HttpTransport};
pub use token_file::FileTokenStore;
