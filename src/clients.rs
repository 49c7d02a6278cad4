//! HTTP clients for the external services behind the tools.
//!
//! Each client is cheap to clone and shares one `reqwest::Client`, so they are
//! built once at startup and handed to the tools that need them.

pub mod duckduckgo;
pub mod flickr;
pub mod open_meteo;
pub mod watsonx;

use std::time::Duration;

use reqwest::{Response, StatusCode};

pub const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; image-agent/", env!("CARGO_PKG_VERSION"), ")");
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Shared HTTP client with the crate's user agent and timeout.
pub fn http_client() -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Turn a non-2xx response into [`ClientError::Status`] carrying the body text.
pub(crate) async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

pub(crate) fn trim_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}
