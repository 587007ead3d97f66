//! Robots.txt caching implementation
//!
//! Each site root is fetched at most once per crawl. Concurrent lookups for a
//! root that is still being fetched wait on the same in-progress fetch.

use crate::config::RobotsFailurePolicy;
use crate::crawler::HttpClient;
use crate::robots::{fetch_robots, ParsedRobots, WILDCARD_AGENT};
use crate::url::SiteRoot;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Fetch status of a site root's robots.txt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsStatus {
    /// Not fetched yet, or a fetch is in progress
    Pending,
    /// Rules are available (possibly allow-all)
    Fetched,
    /// The fetch failed; the failure policy applies
    Failed,
}

/// Cached robots.txt data for a site root
///
/// Stores the parsed rules along with the timestamp when they were fetched.
#[derive(Debug, Clone)]
pub struct RobotsEntry {
    pub status: RobotsStatus,

    /// Parsed rules, present only when `status` is `Fetched`
    pub rules: Option<ParsedRobots>,

    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
}

impl RobotsEntry {
    pub fn fetched(rules: ParsedRobots) -> Self {
        Self {
            status: RobotsStatus::Fetched,
            rules: Some(rules),
            fetched_at: Utc::now(),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: RobotsStatus::Failed,
            rules: None,
            fetched_at: Utc::now(),
        }
    }
}

/// Per-crawl robots.txt cache keyed by site root
pub struct RobotsCache {
    client: Arc<dyn HttpClient>,
    on_failure: RobotsFailurePolicy,
    entries: Mutex<HashMap<SiteRoot, Arc<OnceCell<RobotsEntry>>>>,
}

impl RobotsCache {
    /// Creates an empty cache that fetches through `client`
    pub fn new(client: Arc<dyn HttpClient>, on_failure: RobotsFailurePolicy) -> Self {
        Self {
            client,
            on_failure,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the rules for a site root, fetching them on first use
    ///
    /// # Returns
    ///
    /// * `Some(ParsedRobots)` - The root's rules (allow-all when the site has none)
    /// * `None` - If the fetch failed
    pub async fn get_rules(&self, root: &SiteRoot) -> Option<ParsedRobots> {
        self.entry(root).await.rules.clone()
    }

    /// Checks whether `url` may be fetched under its site root's rules
    ///
    /// A root whose robots.txt could not be fetched is governed by the
    /// configured failure policy.
    pub async fn is_allowed(&self, root: &SiteRoot, url: &str) -> bool {
        let entry = self.entry(root).await;
        match (&entry.status, &entry.rules) {
            (RobotsStatus::Fetched, Some(rules)) => rules.is_allowed(url, WILDCARD_AGENT),
            _ => self.on_failure == RobotsFailurePolicy::Allow,
        }
    }

    /// Returns the current status of a site root without triggering a fetch
    pub fn status(&self, root: &SiteRoot) -> RobotsStatus {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(root)
            .and_then(|cell| cell.get())
            .map(|entry| entry.status)
            .unwrap_or(RobotsStatus::Pending)
    }

    /// Number of site roots whose robots.txt fetch failed
    pub fn failed_count(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .filter(|cell| matches!(cell.get(), Some(e) if e.status == RobotsStatus::Failed))
            .count()
    }

    /// Number of site roots seen so far
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn entry(&self, root: &SiteRoot) -> RobotsEntry {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(root.clone()).or_default())
        };

        cell.get_or_init(|| fetch_robots(self.client.as_ref(), root))
            .await
            .clone()
    }
}
