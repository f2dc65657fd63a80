//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of one crawl session (idle, running, draining, done)

mod crawl_state;

pub use crawl_state::CrawlState;
