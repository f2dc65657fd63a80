//! Crawler module for fetching and processing pages
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` seam and its reqwest-backed implementation
//! - Content classification and artifact extraction
//! - Visited tracking and the frontier queue
//! - Overall crawl coordination

mod classifier;
mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod visited;

pub use classifier::{classify, is_textual, Classification};
pub use coordinator::{Coordinator, CrawlResult};
pub use extractor::{
    extract_comments, extract_emails, extract_external_files, extract_form_fields,
    extract_links, extract_media, extract_page, extract_page_with, extract_scripts,
    ExtractionError, LinkExtraction, PageExtraction, SelectorTable,
};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher, Response};
pub use frontier::Frontier;
pub use visited::VisitedSet;

use crate::config::Config;
use crate::ZeroxError;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a crawl without cancellation. It will:
/// 1. Validate the configuration and seed
/// 2. Build the HTTP client
/// 3. Traverse every reachable page on the seed's host
/// 4. Return the finalized report and statistics
///
/// # Arguments
///
/// * `seed` - The seed URL
/// * `config` - The crawler configuration
///
/// # Example
///
/// ```no_run
/// use zeroxplorer::config::Config;
/// use zeroxplorer::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = crawl("https://example.com/", Config::default()).await?;
/// println!("{} links", result.report.links.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed: &str, config: Config) -> Result<CrawlResult, ZeroxError> {
    Coordinator::with_http_fetcher(seed, config)?.run().await
}
