//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns one crawl session from seed to report:
//! - Validating the configuration and seed before anything is fetched
//! - Managing the frontier and the visited set
//! - Dispatching bounded concurrent fetch tasks on a `JoinSet`
//! - Folding each task's outcome back into the frontier and statistics
//! - Handling cancellation and finalizing the report

use crate::config::{validate, Config};
use crate::crawler::classifier::{classify, Classification};
use crate::crawler::extractor::extract_page;
use crate::crawler::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::visited::VisitedSet;
use crate::output::{ArtifactKind, CrawlReport, CrawlStatistics, ResultAggregator};
use crate::state::CrawlState;
use crate::url::{canonicalize, parse_seed, ScopeFilter};
use crate::ZeroxError;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Final product of a crawl session
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The aggregated artifacts
    pub report: CrawlReport,

    /// Counters collected while crawling
    pub statistics: CrawlStatistics,
}

/// What one page task hands back to the coordinator
#[derive(Debug)]
enum PageOutcome {
    /// Textual page run through the extractors
    Extracted {
        url: Url,
        discovered: Vec<Url>,
        failures: usize,
    },

    /// Non-text resource cataloged as an external file
    Opaque { url: Url },

    /// Redirect hop that was not followed
    RedirectSkipped {
        from: Url,
        to: Url,
        reason: &'static str,
    },

    FetchFailed(FetchError),
}

/// Shared handles every page task needs
#[derive(Clone)]
struct PageContext {
    fetcher: Arc<dyn Fetcher>,
    scope: Arc<ScopeFilter>,
    visited: Arc<VisitedSet>,
    aggregator: Arc<ResultAggregator>,
    max_redirects: u32,
}

/// Main crawler coordinator structure
///
/// One coordinator drives exactly one crawl; [`Coordinator::run`] consumes it.
pub struct Coordinator {
    config: Arc<Config>,
    seed: Url,
    scope: Arc<ScopeFilter>,
    fetcher: Arc<dyn Fetcher>,
    visited: Arc<VisitedSet>,
    frontier: Frontier,
    aggregator: Arc<ResultAggregator>,
    stats: CrawlStatistics,
    state: CrawlState,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed URL; its host bounds the crawl
    /// * `config` - The crawler configuration
    /// * `fetcher` - The fetch collaborator
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, with the seed in the frontier
    /// * `Err(ZeroxError::Config)` - Invalid configuration or seed
    pub fn new(seed: &str, config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, ZeroxError> {
        validate(&config)?;
        let seed = parse_seed(seed)?;
        let scope = ScopeFilter::new(&seed)?;

        let mut coordinator = Self {
            config: Arc::new(config),
            seed: seed.clone(),
            scope: Arc::new(scope),
            fetcher,
            visited: Arc::new(VisitedSet::new()),
            frontier: Frontier::new(),
            aggregator: Arc::new(ResultAggregator::new()),
            stats: CrawlStatistics::new(),
            state: CrawlState::Idle,
            cancel: CancellationToken::new(),
        };
        coordinator.enqueue(seed);

        Ok(coordinator)
    }

    /// Creates a coordinator that fetches over HTTP with a client built from
    /// `config`
    pub fn with_http_fetcher(seed: &str, config: Config) -> Result<Self, ZeroxError> {
        validate(&config)?;
        let fetcher = HttpFetcher::from_config(&config)?;
        Self::new(seed, config, Arc::new(fetcher))
    }

    /// Token that stops dispatch when cancelled
    ///
    /// In-flight fetches still complete and a partial report is produced.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Number of URLs waiting in the frontier
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Admits `url` to the frontier if it is in scope and unvisited
    ///
    /// Returns true if the URL was queued.
    pub fn enqueue(&mut self, url: Url) -> bool {
        if !self.scope.accepts_url(&url) {
            tracing::debug!("Not enqueuing out-of-scope URL {}", url);
            return false;
        }
        if !self.visited.try_visit(&url) {
            return false;
        }
        tracing::trace!("Enqueued {}", url);
        self.frontier.push(url);
        true
    }

    /// Runs the crawl to completion (or cancellation) and returns the report
    ///
    /// The loop keeps up to `max-concurrent-fetches` page tasks in flight.
    /// Each finished task returns its discovered links, which are admitted
    /// through the visited set before anything else is dispatched.
    pub async fn run(mut self) -> Result<CrawlResult, ZeroxError> {
        self.state = self.state.transition(CrawlState::Running)?;
        tracing::info!(
            "Starting crawl of {} (scope: {})",
            self.seed,
            self.scope.host()
        );

        let max_in_flight = self.config.crawler.max_concurrent_fetches.max(1) as usize;
        let cancel = self.cancel.clone();
        let mut tasks: JoinSet<PageOutcome> = JoinSet::new();
        let mut processed: u64 = 0;
        let mut cancel_seen = false;
        let start_time = Instant::now();

        loop {
            if !cancel.is_cancelled() {
                while tasks.len() < max_in_flight {
                    let Some(url) = self.frontier.pop() else {
                        break;
                    };
                    self.dispatch(&mut tasks, url);
                }
            }

            if tasks.is_empty() {
                break;
            }

            let joined = tokio::select! {
                joined = tasks.join_next() => joined,
                _ = cancel.cancelled(), if !cancel_seen => {
                    cancel_seen = true;
                    tracing::warn!(
                        "Crawl cancelled, waiting for {} in-flight fetch(es)",
                        tasks.len()
                    );
                    continue;
                }
            };

            let Some(joined) = joined else {
                break;
            };
            self.handle_outcome(joined);
            processed += 1;

            if processed % 10 == 0 {
                let rate = processed as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} URLs processed, {} in frontier, {} in flight, {:.2} URLs/sec",
                    processed,
                    self.frontier.len(),
                    tasks.len(),
                    rate
                );
            }
        }

        self.state = self.state.transition(CrawlState::Draining)?;
        self.stats.cancelled = cancel.is_cancelled();
        self.stats.urls_enqueued = self.frontier.total_enqueued();
        if self.stats.cancelled {
            tracing::info!(
                "Crawl stopped with {} URL(s) left in the frontier",
                self.frontier.len()
            );
        }

        let aggregator = Arc::try_unwrap(self.aggregator)
            .map_err(|shared| ZeroxError::AggregatorInUse(Arc::strong_count(&shared) - 1))?;
        let report = aggregator.finalize();
        self.state = self.state.transition(CrawlState::Done)?;
        self.stats.finish();

        tracing::info!(
            "Crawl completed: {} URLs processed, {} artifacts in {:?}",
            processed,
            report.total(),
            start_time.elapsed()
        );

        Ok(CrawlResult {
            report,
            statistics: self.stats,
        })
    }

    fn dispatch(&mut self, tasks: &mut JoinSet<PageOutcome>, url: Url) {
        tracing::debug!("Dispatching {}", url);
        self.stats.fetches_dispatched += 1;

        let context = PageContext {
            fetcher: Arc::clone(&self.fetcher),
            scope: Arc::clone(&self.scope),
            visited: Arc::clone(&self.visited),
            aggregator: Arc::clone(&self.aggregator),
            max_redirects: self.config.crawler.max_redirects,
        };
        tasks.spawn(process_url(context, url));
    }

    fn handle_outcome(&mut self, joined: Result<PageOutcome, JoinError>) {
        match joined {
            Ok(PageOutcome::Extracted {
                url,
                discovered,
                failures,
            }) => {
                self.stats.pages_fetched += 1;
                self.stats.pages_extracted += 1;
                self.stats.extraction_failures += failures as u64;

                let found = discovered.len();
                let queued = discovered
                    .into_iter()
                    .filter(|candidate| self.enqueue(candidate.clone()))
                    .count();
                tracing::debug!(
                    "Processed {}: {} in-scope link(s), {} new",
                    url,
                    found,
                    queued
                );
            }

            Ok(PageOutcome::Opaque { url }) => {
                self.stats.pages_fetched += 1;
                self.stats.opaque_resources += 1;
                tracing::debug!("Cataloged non-text resource {}", url);
            }

            Ok(PageOutcome::RedirectSkipped { from, to, reason }) => {
                self.stats.redirects_skipped += 1;
                tracing::debug!("Not following redirect {} -> {}: {}", from, to, reason);
            }

            Ok(PageOutcome::FetchFailed(error)) => {
                self.stats.fetch_failures += 1;
                tracing::warn!("Fetch failed: {}", error);
            }

            Err(error) => {
                self.stats.extraction_failures += 1;
                tracing::error!("Page task failed: {}", error);
            }
        }
    }
}

/// Fetches one URL, classifies it, and merges its artifacts
///
/// Each redirect hop must pass the scope filter and claim its target in the
/// visited set before it is fetched, exactly like a discovered link.
/// Extraction runs synchronously once the fetch resolves; the parsed document
/// never lives across an await point.
async fn process_url(context: PageContext, url: Url) -> PageOutcome {
    let PageContext {
        fetcher,
        scope,
        visited,
        aggregator,
        max_redirects,
    } = context;

    let mut current = url;
    let mut hops = 0;
    let response = loop {
        let response = match fetcher.fetch(&current).await {
            Ok(response) => response,
            Err(error) => return PageOutcome::FetchFailed(error),
        };
        let Some(target) = response.redirect.clone() else {
            break response;
        };

        hops += 1;
        if hops > max_redirects {
            return PageOutcome::FetchFailed(FetchError::Redirect {
                url: current.to_string(),
                message: format!("more than {} redirects", max_redirects),
            });
        }

        let target = canonicalize(target);
        if !scope.accepts_url(&target) {
            return PageOutcome::RedirectSkipped {
                from: current,
                to: target,
                reason: "target is out of scope",
            };
        }
        if !visited.try_visit(&target) {
            return PageOutcome::RedirectSkipped {
                from: current,
                to: target,
                reason: "target already visited",
            };
        }
        current = target;
    };

    match classify(response) {
        Classification::Opaque { url } => {
            aggregator.merge(ArtifactKind::ExternalFiles, [url.to_string()]);
            PageOutcome::Opaque { url }
        }

        Classification::Extractable(response) => {
            let body = response.text();
            let extraction = extract_page(&body, &response.url, &scope);

            for (kind, error) in &extraction.failures {
                tracing::warn!("{} extractor failed on {}: {}", kind, response.url, error);
            }

            let failures = extraction.failures.len();
            let mut added = 0;
            for (kind, values) in extraction.artifacts {
                added += aggregator.merge(kind, values);
            }
            tracing::trace!("{} new artifact(s) from {}", added, response.url);

            PageOutcome::Extracted {
                url: response.url.clone(),
                discovered: extraction.discovered,
                failures,
            }
        }
    }
}
