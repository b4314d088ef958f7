//! Driven port for one REST resource.
//!
//! The domain owns the resource contract and the failure taxonomy so the list
//! store and join queries stay independent of the HTTP stack underneath.

use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::define_port_error;

/// A record type served by a REST resource.
///
/// `Id` is the server-assigned identity, which never changes once issued.
/// `Draft` is what the client submits on create and update; the server
/// answers with the canonical record.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Server-assigned identifier.
    type Id: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;
    /// Client-submitted payload for create and update calls.
    type Draft: Serialize + Send + Sync;

    /// Identity of this record.
    fn id(&self) -> &Self::Id;

    /// Path segments addressing one record below the resource path.
    fn path_segments(id: &Self::Id) -> Vec<String> {
        vec![id.to_string()]
    }
}

define_port_error! {
    /// Errors surfaced by a single REST call.
    pub enum RequestError {
        /// No usable response arrived (connect, DNS, timeout, body read).
        Transport { message: String } =>
            "request transport failed: {message}",
        /// The response status differs from the single expected success code.
        UnexpectedStatus { status: u16, expected: u16, body: String } =>
            "unexpected status {status} (expected {expected}): {body}",
        /// The response body was not the JSON the operation expects.
        Decode { message: String } =>
            "response decode failed: {message}",
    }
}

impl RequestError {
    /// HTTP status carried by the failure, when a response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Return whether the server rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Port for calling one REST resource.
///
/// Each operation is exactly one request; there is no retry, no caching and no
/// state kept between calls.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    /// Fetch one page (`GET {resource}?take=&page=`, expects 200).
    async fn list(&self, request: PageRequest) -> Result<Page<R>, RequestError>;

    /// Fetch the whole unpaginated collection (`GET {resource}`, expects 200).
    async fn list_all(&self) -> Result<Vec<R>, RequestError>;

    /// Fetch one record (`GET {resource}/{id}`, expects 200).
    async fn get(&self, id: &R::Id) -> Result<R, RequestError>;

    /// Create a record (`POST {resource}`, expects 201).
    async fn create(&self, draft: &R::Draft) -> Result<R, RequestError>;

    /// Replace a record (`PUT {resource}/{id}`, expects 200).
    async fn update(&self, id: &R::Id, draft: &R::Draft) -> Result<R, RequestError>;

    /// Delete a record (`DELETE {resource}/{id}`, expects 200).
    async fn remove(&self, id: &R::Id) -> Result<(), RequestError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error classification helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorized(RequestError::unexpected_status(401_u16, 200_u16, ""), Some(401), true)]
    #[case::server_error(RequestError::unexpected_status(500_u16, 200_u16, "boom"), Some(500), false)]
    #[case::transport(RequestError::transport("connection refused"), None, false)]
    #[case::decode(RequestError::decode("expected value"), None, false)]
    fn status_is_only_present_for_unexpected_status(
        #[case] error: RequestError,
        #[case] status: Option<u16>,
        #[case] unauthorized: bool,
    ) {
        assert_eq!(error.status(), status);
        assert_eq!(error.is_unauthorized(), unauthorized);
    }

    #[test]
    fn unexpected_status_message_names_both_codes() {
        let error = RequestError::unexpected_status(500_u16, 201_u16, "internal");
        assert_eq!(
            error.to_string(),
            "unexpected status 500 (expected 201): internal"
        );
        assert_eq!(error.kind(), "UnexpectedStatus");
    }
}
