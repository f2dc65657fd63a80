//! Lifecycle state definitions for a single crawl session
//!
//! A crawl moves strictly forward through these states; any other move is a
//! programming error and is rejected by [`CrawlState::transition`].

use crate::ZeroxError;
use std::fmt;

/// Represents where a crawl session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlState {
    /// Session built, nothing dispatched yet
    #[default]
    Idle,

    /// At least one fetch in flight or the frontier is non-empty
    Running,

    /// Frontier empty and every in-flight task settled; report not yet built
    Draining,

    /// Report finalized; terminal
    Done,
}

impl CrawlState {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
        )
    }

    /// Performs a checked transition
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlState)` - The new state
    /// * `Err(ZeroxError::InvalidTransition)` - `next` is not a legal successor
    pub fn transition(self, next: CrawlState) -> Result<CrawlState, ZeroxError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ZeroxError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
