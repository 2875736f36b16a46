//! Shared reqwest transport for the Persistence Service adapters.
//!
//! Owns the base URL, the bearer header, and status/body classification.
//! Each adapter maps [`HttpFailure`] into its own port error.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use crate::domain::Session;

/// Failure classes observed at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum HttpFailure {
    /// The session carries no bearer credential; nothing was sent.
    MissingCredential,
    /// The request could not be built or sent.
    Transport { message: String, timed_out: bool },
    /// The service answered with a non-success status.
    Status { status: StatusCode, message: String },
}

/// HTTP client bound to one Persistence Service base URL.
#[derive(Debug, Clone)]
pub struct PersistenceClient {
    client: Client,
    base_url: Url,
}

impl PersistenceClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub(super) fn http(&self) -> &Client {
        &self.client
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HttpFailure::Transport {
                message: format!("base url {} cannot carry a path", self.base_url),
                timed_out: false,
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the session's bearer credential, send, and return the body of a
    /// successful response.
    pub(super) async fn send(
        &self,
        session: &Session,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, HttpFailure> {
        let token = session
            .credential()
            .ok_or(HttpFailure::MissingCredential)?;
        let response = request
            .bearer_auth(token.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(status_failure(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn map_transport_error(error: reqwest::Error) -> HttpFailure {
    HttpFailure::Transport {
        timed_out: error.is_timeout(),
        message: error.to_string(),
    }
}

pub(super) fn status_failure(status: StatusCode, body: &[u8]) -> HttpFailure {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };
    HttpFailure::Status { status, message }
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
