//! Run statistics
//!
//! Counters are lock-free so fetch and parse workers can record outcomes
//! without contending on the result store.

use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all workers of one run
#[derive(Debug, Default)]
pub struct CrawlStats {
    outcomes: [AtomicU64; 7],
    retries: AtomicU64,
    links_discovered: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terminal outcome of a claimed URL
    pub fn record(&self, state: PageState) {
        self.outcomes[state.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retries(&self, count: u64) {
        self.retries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_links(&self, count: usize) {
        self.links_discovered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn count(&self, state: PageState) -> u64 {
        self.outcomes[state.index()].load(Ordering::Relaxed)
    }

    /// Number of URLs that reached a terminal state
    pub fn completed(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }

    /// Freezes the counters into an immutable summary
    pub fn snapshot(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        robots_failures: u64,
        cancelled: bool,
    ) -> CrawlStatistics {
        let pages_by_state = PageState::all_states()
            .into_iter()
            .map(|state| (state, self.count(state)))
            .filter(|(_, count)| *count > 0)
            .collect();

        CrawlStatistics {
            started_at,
            finished_at,
            total_pages: self.completed(),
            pages_by_state,
            retries: self.retries.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            robots_failures,
            cancelled,
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Total number of claimed URLs that reached a terminal state
    pub total_pages: u64,

    /// Count of pages by state (states with no pages are omitted)
    pub pages_by_state: BTreeMap<PageState, u64>,

    /// Retries performed across all URLs
    pub retries: u64,

    /// Links extracted from processed pages, followed or not
    pub links_discovered: u64,

    /// Site roots whose robots.txt could not be fetched
    pub robots_failures: u64,

    /// Whether the run ended because it was cancelled
    pub cancelled: bool,
}

impl CrawlStatistics {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }
}
