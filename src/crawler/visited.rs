//! Visited URL tracking

use crate::url::canonicalize;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Set of URLs already claimed for fetching
///
/// Keys are canonicalized, so `http://h/p#a` and `http://h/p#b` share a slot.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(url: &Url) -> String {
        canonicalize(url.clone()).into()
    }

    /// Atomically claims `url`
    ///
    /// Returns true exactly once per canonical URL; every later call for the
    /// same URL returns false, regardless of which task makes it.
    pub fn try_visit(&self, url: &Url) -> bool {
        self.lock().insert(Self::key(url))
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(&Self::key(url))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
