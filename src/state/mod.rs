//! State module for tracking crawl progress
//!
//! This module provides the run-scoped shared state of a crawl.
//!
//! # Components
//!
//! - `PageState`: Terminal outcome of each claimed URL
//! - `ResultStore`: The link graph and vote table, updated one page at a time
//! - `CrawlStats`: Lock-free outcome counters, frozen into `CrawlStatistics`
//! - `CrawlState`: Bundles the above with the frontier and robots cache

mod page_state;
mod results;
mod stats;

// Re-export main types
pub use page_state::PageState;
pub use results::{PageUpdate, ResultGraph, ResultStore, VoteTable, WeightedEdge};
pub use stats::{CrawlStatistics, CrawlStats};

use crate::crawler::Frontier;
use crate::robots::RobotsCache;

/// Everything one crawl run shares between its workers
///
/// Owned by the engine for the duration of a run and handed to workers
/// behind an `Arc`. Each part synchronizes its own operations.
pub struct CrawlState {
    pub frontier: Frontier,
    pub results: ResultStore,
    pub robots: RobotsCache,
    pub stats: CrawlStats,
}

impl CrawlState {
    pub fn new(frontier: Frontier, robots: RobotsCache) -> Self {
        Self {
            frontier,
            results: ResultStore::new(),
            robots,
            stats: CrawlStats::new(),
        }
    }
}
