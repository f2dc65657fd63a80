//! Output handler traits and error types
//!
//! This module defines the trait interface for report writers and the
//! errors they can produce.

use crate::output::aggregator::CrawlReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report destinations
///
/// A handler receives the finalized report exactly once, at crawl completion.
pub trait OutputHandler {
    /// Writes the finalized report
    ///
    /// # Arguments
    ///
    /// * `report` - The immutable crawl report
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()>;

    /// Human-readable description of where the report goes
    fn destination(&self) -> String;
}
