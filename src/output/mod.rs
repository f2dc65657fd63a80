//! Output module for aggregating artifacts and writing the crawl report
//!
//! This module handles:
//! - The thread-safe aggregator every page task merges into
//! - The finalized, serializable report
//! - Writing the report as JSON
//! - Crawl statistics and the end-of-run summary

mod aggregator;
mod json;
pub mod stats;
mod traits;

pub use aggregator::{ArtifactKind, CrawlReport, ResultAggregator};
pub use json::{report_to_json, JsonReportWriter};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputHandler, OutputResult};
