//! Artifact collections and the shared result aggregator
//!
//! Every page task contributes artifacts through [`ResultAggregator::merge`];
//! nothing else mutates the collections. The aggregator is consumed by
//! [`ResultAggregator::finalize`], which turns the nine sets into the
//! immutable [`CrawlReport`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The nine artifact collections of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Emails,
    Links,
    ExternalFiles,
    JsFiles,
    FormFields,
    Images,
    Videos,
    Audio,
    Comments,
}

impl ArtifactKind {
    /// Every kind, in report order
    pub const ALL: [ArtifactKind; 9] = [
        Self::Emails,
        Self::Links,
        Self::ExternalFiles,
        Self::JsFiles,
        Self::FormFields,
        Self::Images,
        Self::Videos,
        Self::Audio,
        Self::Comments,
    ];

    /// The report key for this collection
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emails => "emails",
            Self::Links => "links",
            Self::ExternalFiles => "external_files",
            Self::JsFiles => "js_files",
            Self::FormFields => "form_fields",
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Audio => "audio",
            Self::Comments => "comments",
        }
    }

    /// Parses a report key back into a kind
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finalized crawl report
///
/// Field order is the serialization order; every array is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub emails: Vec<String>,
    pub links: Vec<String>,
    pub external_files: Vec<String>,
    pub js_files: Vec<String>,
    pub form_fields: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub audio: Vec<String>,
    pub comments: Vec<String>,
}

impl CrawlReport {
    /// Returns the collection for `kind`
    pub fn get(&self, kind: ArtifactKind) -> &[String] {
        match kind {
            ArtifactKind::Emails => &self.emails,
            ArtifactKind::Links => &self.links,
            ArtifactKind::ExternalFiles => &self.external_files,
            ArtifactKind::JsFiles => &self.js_files,
            ArtifactKind::FormFields => &self.form_fields,
            ArtifactKind::Images => &self.images,
            ArtifactKind::Videos => &self.videos,
            ArtifactKind::Audio => &self.audio,
            ArtifactKind::Comments => &self.comments,
        }
    }

    /// Returns true if `value` is present in the `kind` collection
    pub fn contains(&self, kind: ArtifactKind, value: &str) -> bool {
        self.get(kind).iter().any(|v| v == value)
    }

    /// Total number of artifacts across all collections
    pub fn total(&self) -> usize {
        ArtifactKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    /// Returns true if no collection holds anything
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn from_sets(sets: &[BTreeSet<String>; 9]) -> Self {
        let take = |kind: ArtifactKind| sets[kind.index()].iter().cloned().collect();
        Self {
            emails: take(ArtifactKind::Emails),
            links: take(ArtifactKind::Links),
            external_files: take(ArtifactKind::ExternalFiles),
            js_files: take(ArtifactKind::JsFiles),
            form_fields: take(ArtifactKind::FormFields),
            images: take(ArtifactKind::Images),
            videos: take(ArtifactKind::Videos),
            audio: take(ArtifactKind::Audio),
            comments: take(ArtifactKind::Comments),
        }
    }
}

/// Thread-safe accumulator for the nine artifact sets
#[derive(Debug, Default)]
pub struct ResultAggregator {
    sets: Mutex<[BTreeSet<String>; 9]>,
}

impl ResultAggregator {
    /// Creates an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    // A page task that panicked while holding the lock can only have left
    // whole strings behind, so the data is still usable.
    fn lock(&self) -> MutexGuard<'_, [BTreeSet<String>; 9]> {
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Union-inserts `values` into the `kind` collection
    ///
    /// # Returns
    ///
    /// The number of values that were not already present
    pub fn merge<I, S>(&self, kind: ArtifactKind, values: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sets = self.lock();
        let set = &mut sets[kind.index()];
        let mut added = 0;
        for value in values {
            if set.insert(value.into()) {
                added += 1;
            }
        }
        added
    }

    /// Number of distinct values currently in `kind`
    pub fn len(&self, kind: ArtifactKind) -> usize {
        self.lock()[kind.index()].len()
    }

    /// Returns true if every collection is empty
    pub fn is_empty(&self) -> bool {
        self.lock().iter().all(BTreeSet::is_empty)
    }

    /// Point-in-time copy of all collections, taken under one lock
    pub fn snapshot(&self) -> CrawlReport {
        CrawlReport::from_sets(&self.lock())
    }

    /// Consumes the aggregator and produces the final report
    pub fn finalize(self) -> CrawlReport {
        let sets = self.sets.into_inner().unwrap_or_else(PoisonError::into_inner);
        CrawlReport::from_sets(&sets)
    }
}
