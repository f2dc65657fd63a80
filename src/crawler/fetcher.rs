//! HTTP fetcher implementation
//!
//! This module handles all network access for the crawler, including:
//! - The `Fetcher` seam the coordinator calls through
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests and body download
//! - Reporting redirects as hops instead of following them
//! - Error classification into `FetchError`

use crate::config::Config;
use crate::crawler::classifier::is_textual;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// One fetched resource
#[derive(Debug, Clone)]
pub struct Response {
    /// URL that produced this response
    pub url: Url,

    /// Target of a 3xx response, resolved against `url`
    ///
    /// The fetcher never follows redirects itself; the caller decides whether
    /// the target may be fetched.
    pub redirect: Option<Url>,

    /// Content-Type header value, if present and valid UTF-8
    pub content_type: Option<String>,

    /// Raw body bytes (left empty for non-text resources)
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a response
    pub fn new(url: Url, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url,
            redirect: None,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// Creates a redirect hop from `url` to `location`
    pub fn redirect(url: Url, location: Url) -> Self {
        Self {
            url,
            redirect: Some(location),
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Returns true if this response is a redirect hop
    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Transport-level failure for one URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Redirect error for {url}: {message}")]
    Redirect { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    /// Classifies a reqwest error
    ///
    /// | Condition | Variant |
    /// |-----------|---------|
    /// | Timeout | `Timeout` |
    /// | Connection refused, DNS, TLS | `Connect` |
    /// | Too many redirects | `Redirect` |
    /// | Body read / decode failure | `Body` |
    /// | Anything else | `Other` |
    pub fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else if error.is_redirect() {
            Self::Redirect {
                url,
                message: error.to_string(),
            }
        } else if error.is_body() || error.is_decode() {
            Self::Body {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Other {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// The fetch collaborator the coordinator depends on
///
/// Implementations own their timeout and retry policy and must report every
/// failure as a `FetchError` rather than panicking. Redirects are not
/// followed: a 3xx answer comes back as a [`Response::redirect`] hop so that
/// every hop goes through the same scope and visited checks as a link.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one URL
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use zeroxplorer::config::Config;
/// use zeroxplorer::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout))
        .redirect(Policy::none()) // Redirects are handed back as hops
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL with a single GET
    ///
    /// A 3xx with a usable `Location` becomes a redirect hop. Other non-2xx
    /// statuses become `FetchError::Status`. The body is only downloaded for
    /// textual content types, since opaque resources are cataloged by URL
    /// alone.
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status.is_redirection() {
            let location = redirect_location(url, response.headers())?;
            tracing::debug!("{} redirects to {}", url, location);
            return Ok(Response::redirect(url.clone(), location));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !is_textual(content_type.as_deref()) {
            tracing::trace!("Skipping body of non-text resource {}", final_url);
            return Ok(Response::new(final_url, content_type.as_deref(), Vec::new()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(Response::new(final_url, content_type.as_deref(), body.to_vec()))
    }
}

/// Resolves the `Location` header of a 3xx response against the request URL
fn redirect_location(url: &Url, headers: &HeaderMap) -> Result<Url, FetchError> {
    let location = headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| FetchError::Redirect {
            url: url.to_string(),
            message: "missing or invalid Location header".to_string(),
        })?;

    url.join(location).map_err(|e| FetchError::Redirect {
        url: url.to_string(),
        message: format!("bad Location '{}': {}", location, e),
    })
}
