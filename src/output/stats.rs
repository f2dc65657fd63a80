//! Crawl statistics
//!
//! Counters kept by the coordinator while the crawl runs, and a printer for
//! the end-of-run summary.

use crate::output::aggregator::{ArtifactKind, CrawlReport};
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished (set once the report is finalized)
    pub finished_at: Option<DateTime<Utc>>,

    /// URLs handed to the fetcher
    pub fetches_dispatched: u64,

    /// Responses received successfully
    pub pages_fetched: u64,

    /// Textual responses run through the extraction pipeline
    pub pages_extracted: u64,

    /// Non-text responses cataloged as external files
    pub opaque_resources: u64,

    /// Transport-level failures
    pub fetch_failures: u64,

    /// Redirect hops not followed (off-host or already visited)
    pub redirects_skipped: u64,

    /// Extractor failures and crashed page tasks
    pub extraction_failures: u64,

    /// URLs admitted to the frontier (including the seed)
    pub urls_enqueued: u64,

    /// True if the crawl was cancelled before the frontier ran dry
    pub cancelled: bool,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStatistics {
    /// Creates a zeroed statistics record stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            fetches_dispatched: 0,
            pages_fetched: 0,
            pages_extracted: 0,
            opaque_resources: 0,
            fetch_failures: 0,
            redirects_skipped: 0,
            extraction_failures: 0,
            urls_enqueued: 0,
            cancelled: false,
        }
    }

    /// Marks the crawl as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, if finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Share of dispatched fetches that failed, as a percentage
    pub fn failure_rate(&self) -> f64 {
        if self.fetches_dispatched == 0 {
            return 0.0;
        }
        (self.fetch_failures as f64 / self.fetches_dispatched as f64) * 100.0
    }
}

/// Prints statistics and per-collection counts to stdout
pub fn print_statistics(stats: &CrawlStatistics, report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {:.2}s", duration);
    }
    if stats.cancelled {
        println!("  Status: cancelled (partial report)");
    } else {
        println!("  Status: complete");
    }
    println!();

    println!("Traversal:");
    println!("  URLs enqueued: {}", stats.urls_enqueued);
    println!("  Fetches dispatched: {}", stats.fetches_dispatched);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Pages extracted: {}", stats.pages_extracted);
    println!("  Opaque resources: {}", stats.opaque_resources);
    println!(
        "  Fetch failures: {} ({:.1}%)",
        stats.fetch_failures,
        stats.failure_rate()
    );
    println!("  Redirects skipped: {}", stats.redirects_skipped);
    println!("  Extraction failures: {}", stats.extraction_failures);
    println!();

    println!("Artifacts:");
    for kind in ArtifactKind::ALL {
        println!("  {}: {}", kind, report.get(kind).len());
    }
}
