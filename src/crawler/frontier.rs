//! Frontier queue
//!
//! FIFO queue of URLs waiting to be dispatched. Admission control lives in
//! [`VisitedSet`](crate::crawler::VisitedSet); the frontier only orders work.

use std::collections::VecDeque;
use url::Url;

/// URLs admitted to the crawl but not yet dispatched
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    total_enqueued: u64,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the back of the queue
    pub fn push(&mut self, url: Url) {
        self.queue.push_back(url);
        self.total_enqueued += 1;
    }

    /// Takes the oldest queued URL
    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Number of URLs waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs ever pushed
    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }
}
