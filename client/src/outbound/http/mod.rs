//! Reqwest-backed adapters for the REST resource and auth ports.
//!
//! Both adapters share [`HttpTransport`]: one reqwest client with an explicit
//! timeout, the session handle read on every request, and the mapping from
//! transport failures and unexpected statuses into [`RequestError`].

mod auth_service;
mod dto;
mod resource_client;

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::SessionHandle;
use crate::domain::ports::RequestError;

pub use auth_service::HttpAuthService;
pub use resource_client::HttpResourceClient;

/// Shared reqwest client plus the session it authenticates with.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    session: SessionHandle,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration, session: SessionHandle) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, session })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Send one request and return its body when the status is `expected`.
    ///
    /// The `Authorization` header is taken from the session at this moment,
    /// so a logout takes effect on the very next request.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> Result<Vec<u8>, RequestError> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(authorization) = self.session.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }
        let request = request.build().map_err(map_transport_error)?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| log_failure(&method, &url, map_transport_error(error)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| log_failure(&method, &url, map_transport_error(error)))?;
        debug!(%method, %url, status = status.as_u16(), "response received");

        if status != expected {
            return Err(log_failure(
                &method,
                &url,
                map_status_error(status, expected, body.as_ref()),
            ));
        }
        Ok(body.to_vec())
    }
}

fn log_failure(method: &reqwest::Method, url: &Url, error: RequestError) -> RequestError {
    warn!(%method, %url, kind = error.kind(), %error, "request failed");
    error
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, RequestError> {
    serde_json::from_slice(body)
        .map_err(|error| RequestError::decode(format!("invalid {what} payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> RequestError {
    RequestError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, expected: StatusCode, body: &[u8]) -> RequestError {
    RequestError::unexpected_status(status.as_u16(), expected.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Append `segments` to `base` as individually percent-encoded path segments.
pub(crate) fn join_segments<I, S>(base: &Url, segments: I) -> Result<Url, RequestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| RequestError::transport(format!("{base} cannot carry path segments")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, StatusCode::OK)]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, StatusCode::OK)]
    #[case::ok_instead_of_created(StatusCode::OK, StatusCode::CREATED)]
    fn statuses_other_than_expected_are_reported_with_both_codes(
        #[case] status: StatusCode,
        #[case] expected: StatusCode,
    ) {
        let error = map_status_error(status, expected, b"{\"message\":\"nope\"}");
        assert_eq!(
            error,
            RequestError::unexpected_status(
                status.as_u16(),
                expected.as_u16(),
                "{\"message\":\"nope\"}"
            )
        );
    }

    #[test]
    fn body_preview_compacts_whitespace_and_truncates() {
        assert_eq!(body_preview(b"  internal \n\t error "), "internal error");

        let long = "x".repeat(200);
        let preview = body_preview(long.as_bytes());
        assert_eq!(preview.chars().count(), 163, "160 chars plus ellipsis");
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case::plain("http://localhost:8080/posts", &["7"], "http://localhost:8080/posts/7")]
    #[case::trailing_slash("http://localhost:8080/posts/", &["7"], "http://localhost:8080/posts/7")]
    #[case::composite("http://localhost/price", &["5", "2"], "http://localhost/price/5/2")]
    #[case::escaped("http://localhost/posts", &["a/b c"], "http://localhost/posts/a%2Fb%20c")]
    fn ids_become_single_path_segments(
        #[case] base: &str,
        #[case] segments: &[&str],
        #[case] expected: &str,
    ) {
        let base = Url::parse(base).expect("valid base");
        let url = join_segments(&base, segments).expect("joinable base");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn opaque_urls_are_rejected() {
        let base = Url::parse("mailto:someone@example.com").expect("valid url");
        let error = join_segments(&base, ["7"]).expect_err("mailto has no path");
        assert_eq!(error.kind(), "Transport");
    }

    #[test]
    fn decode_errors_name_the_payload() {
        let error = decode::<Vec<u32>>(b"{}", "collection").expect_err("not an array");
        assert!(error.to_string().contains("invalid collection payload"));
    }
}
