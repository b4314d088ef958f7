//! Domain ports.
//!
//! Driven ports describe what the domain needs from the outside world: a
//! REST resource, the authentication service, and somewhere to keep the
//! bearer token. Outbound adapters implement them; tests substitute doubles.

mod auth_service;
mod macros;
mod resource_client;
mod token_store;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::{AccessGrant, AuthService};
pub use resource_client::{RequestError, Resource, ResourceClient};
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{InMemoryTokenStore, TokenStore, TokenStoreError};
