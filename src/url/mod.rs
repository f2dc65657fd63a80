//! URL handling module for ZeroXplorer
//!
//! This module provides URL normalization, host extraction, reference
//! resolution and the scope filter that keeps the crawl on the seed's host.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::extract_host;
pub use normalize::{canonicalize, normalize_url, parse_seed};
pub use scope::{resolve_reference, ScopeFilter};
