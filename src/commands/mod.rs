//! Board Server Commands
//!
//! HTTP bindings to the board server, organized by domain. Requests carry
//! the session cookie; every failure is classified into an `ApiError`.

mod board;

use board_engine::{ApiError, ApiResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use board::HttpBoardApi;

/// Characters escaped in a path segment (RFC 3986 unreserved stay as is)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Join `base` and path segments, escaping each segment. An empty final
/// segment keeps a trailing slash.
pub fn build_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.extend(utf8_percent_encode(segment, SEGMENT));
    }
    url
}

/// `{ data: T }` response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error body shapes the server uses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// Human readable reason from an error response body
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() && body.len() <= 200 => body.trim().to_string(),
        Err(_) => format!("HTTP {}", status),
    }
}

/// Thin wrapper over `reqwest` that classifies failures
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, segments: &[&str]) -> String {
        build_url(&self.base_url, segments)
    }

    pub fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_include();
        builder
    }

    /// Send and check the status, ignoring the body
    pub async fn send(&self, builder: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, error_message(status, &body)))
    }

    /// Send and decode a JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::NetworkOrServerFailure {
                status: Some(status),
                message: format!("malformed response: {}", e),
            })
    }
}
