//! Shared link graph and vote table
//!
//! Both maps sit behind one lock so that a page's edges and the votes they
//! carry become visible together.

use crate::url::SiteRoot;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Fetched URL → links discovered on that page, in extraction order
pub type ResultGraph = BTreeMap<String, Vec<String>>;

/// Site root → accumulated vote weight
pub type VoteTable = BTreeMap<SiteRoot, f64>;

/// One discovered link together with the vote it carries
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedEdge {
    pub target: String,
    pub target_root: SiteRoot,
    pub weight: f64,
}

/// Everything a single parsed page contributes to the results
#[derive(Debug, Clone, PartialEq)]
pub struct PageUpdate {
    pub source: String,
    pub edges: Vec<WeightedEdge>,
}

impl PageUpdate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edges: Vec::new(),
        }
    }

    pub fn push(&mut self, target: impl Into<String>, target_root: SiteRoot, weight: f64) {
        self.edges.push(WeightedEdge {
            target: target.into(),
            target_root,
            weight,
        });
    }
}

#[derive(Debug, Default)]
struct Results {
    graph: ResultGraph,
    votes: VoteTable,
}

/// Run-scoped store for the result graph and vote table
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<Results>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a page's edges and votes as one unit
    ///
    /// The source entry is created even when the page has no edges. Votes are
    /// only ever added, so per-key totals never decrease.
    pub fn apply(&self, update: PageUpdate) {
        let mut results = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let Results { graph, votes } = &mut *results;

        let links = graph.entry(update.source).or_default();
        links.reserve(update.edges.len());

        for edge in update.edges {
            *votes.entry(edge.target_root).or_insert(0.0) += edge.weight;
            links.push(edge.target);
        }
    }

    /// Returns true if a page entry exists for `url`
    pub fn contains_source(&self, url: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .graph
            .contains_key(url)
    }

    /// Number of pages recorded in the graph
    pub fn page_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .graph
            .len()
    }

    /// Copies out the current graph and vote table
    pub fn snapshot(&self) -> (ResultGraph, VoteTable) {
        let results = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (results.graph.clone(), results.votes.clone())
    }

    /// Consumes the store, returning the graph and vote table
    pub fn into_parts(self) -> (ResultGraph, VoteTable) {
        let results = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (results.graph, results.votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(source: &str, edges: &[(&str, &str, f64)]) -> PageUpdate {
        let mut update = PageUpdate::new(source);
        for (target, root, weight) in edges {
            update.push(*target, SiteRoot::new(*root), *weight);
        }
        update
    }

    #[test]
    fn test_empty_page_creates_entry() {
        let store = ResultStore::new();
        store.apply(PageUpdate::new("https://a.com/"));

        let (graph, votes) = store.snapshot();
        assert_eq!(graph.get("https://a.com/"), Some(&Vec::new()));
        assert!(votes.is_empty());
    }

    #[test]
    fn test_edges_keep_extraction_order() {
        let store = ResultStore::new();
        store.apply(update(
            "https://a.com/",
            &[
                ("https://b.com/y", "https://b.com", 1.0),
                ("https://a.com/x", "https://a.com", 0.1),
            ],
        ));

        let (graph, votes) = store.into_parts();
        assert_eq!(graph["https://a.com/"], vec!["https://b.com/y", "https://a.com/x"]);
        assert_eq!(votes["https://b.com"], 1.0);
        assert_eq!(votes["https://a.com"], 0.1);
    }

    #[test]
    fn test_votes_accumulate_across_pages() {
        let store = ResultStore::new();
        store.apply(update("https://a.com/", &[("https://c.com/", "https://c.com", 1.0)]));
        store.apply(update(
            "https://shop.c.com/",
            &[("https://c.com/z", "https://c.com", 0.25)],
        ));

        let (_, votes) = store.snapshot();
        assert_eq!(votes["https://c.com"], 1.25);
        assert_eq!(store.page_count(), 2);
        assert!(store.contains_source("https://shop.c.com/"));
    }

    #[test]
    fn test_order_independent_totals() {
        let updates = vec![
            update("https://a.com/", &[("https://b.com/", "https://b.com", 1.0)]),
            update("https://b.com/", &[("https://b.com/1", "https://b.com", 0.1)]),
            update(
                "https://x.b.com/",
                &[("https://b.com/2", "https://b.com", 0.25)],
            ),
            update("https://c.com/", &[("https://b.com/3", "https://b.com", 1.0)]),
        ];

        let forward = ResultStore::new();
        for u in updates.iter().cloned() {
            forward.apply(u);
        }

        let reverse = ResultStore::new();
        for u in updates.iter().rev().cloned() {
            reverse.apply(u);
        }

        let (forward_graph, forward_votes) = forward.into_parts();
        let (reverse_graph, reverse_votes) = reverse.into_parts();
        assert_eq!(forward_graph, reverse_graph);
        assert!((forward_votes["https://b.com"] - reverse_votes["https://b.com"]).abs() < 1e-9);
    }
}
