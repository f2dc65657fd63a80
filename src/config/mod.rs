//! Configuration module for ZeroXplorer
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file.
//!
//! # Example
//!
//! ```no_run
//! use zeroxplorer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("zeroxplorer.toml")).unwrap();
//! println!("In-flight limit: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
