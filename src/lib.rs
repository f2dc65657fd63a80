//! ZeroXplorer: a single-domain web reconnaissance crawler
//!
//! This crate walks every page reachable by hyperlinks on the seed URL's host,
//! extracts emails, links, referenced files, scripts, form fields, media and
//! comments from each page, and produces one aggregated report.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for ZeroXplorer operations
#[derive(Debug, Error)]
pub enum ZeroxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Result aggregator is still shared by {0} in-flight task(s)")]
    AggregatorInUse(usize),
}

/// Configuration-specific errors
///
/// Any of these is fatal: they are raised before the first fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Cannot resolve '{reference}' against {base}: {reason}")]
    Unresolvable {
        reference: String,
        base: String,
        reason: String,
    },
}

/// Result type alias for ZeroXplorer operations
pub type Result<T> = std::result::Result<T, ZeroxError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlResult, Fetcher, HttpFetcher};
pub use output::{ArtifactKind, CrawlReport, ResultAggregator};
pub use state::CrawlState;
pub use url::{normalize_url, parse_seed, ScopeFilter};
