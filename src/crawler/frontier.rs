//! Frontier and dedup management
//!
//! `WorkQueue` is the async queue shared by the pipeline stages. `Frontier`
//! pairs one with the visited set that guarantees at-most-once dispatch.

use flume::{Receiver, Sender};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Multi-producer multi-consumer queue with async waiting and close
///
/// An empty queue is not the end of work: `pop` waits until an item arrives
/// or the queue is closed. After `close`, remaining items are still handed
/// out, then `pop` returns `None`.
pub struct WorkQueue<T> {
    // Dropping the only sender disconnects the channel once it is drained.
    sender: Mutex<Option<Sender<T>>>,
    receiver: Receiver<T>,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }
}

impl<T> fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item; returns false (dropping the item) once the queue is closed
    pub fn push(&self, item: T) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender.send(item).is_ok(),
            None => false,
        }
    }

    /// Pops the next item without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next item; `None` once the queue is closed and drained
    pub async fn pop(&self) -> Option<T> {
        self.receiver.recv_async().await.ok()
    }

    /// Stops accepting items and wakes every waiting consumer
    pub fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// A claimed URL waiting for a fetch worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    /// 1 for the start URL, parent depth + 1 for discovered links
    pub depth: u32,
}

/// Visited set plus the queue of claimed, not yet fetched URLs
#[derive(Debug)]
pub struct Frontier {
    max_depth: u32,
    visited: Mutex<HashSet<String>>,
    queue: WorkQueue<FrontierEntry>,
}

impl Frontier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            visited: Mutex::new(HashSet::new()),
            queue: WorkQueue::new(),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether an entry at `depth` may exist in this frontier
    pub fn depth_allowed(&self, depth: u32) -> bool {
        (1..=self.max_depth).contains(&depth)
    }

    /// Atomically claims `url` for fetching
    ///
    /// Returns true for exactly one caller per URL; that caller must enqueue
    /// and fetch it. A depth outside `1..=max_depth` is refused without
    /// marking the URL, so it can still be claimed at a shallower depth.
    pub fn try_claim(&self, url: &str, depth: u32) -> bool {
        if !self.depth_allowed(depth) {
            return false;
        }

        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    /// Adds a claimed URL to the queue
    ///
    /// Returns false when the depth is out of bounds or the frontier is closed.
    pub fn enqueue(&self, url: impl Into<String>, depth: u32) -> bool {
        let url = url.into();
        if !self.depth_allowed(depth) {
            tracing::trace!("Refusing {} at depth {} (max {})", url, depth, self.max_depth);
            return false;
        }

        self.queue.push(FrontierEntry { url, depth })
    }

    /// Pops the next entry; `None` is transient and does not mean the crawl is over
    pub fn dequeue(&self) -> Option<FrontierEntry> {
        self.queue.try_pop()
    }

    /// Waits for the next entry; `None` once the frontier is closed and drained
    pub async fn wait_dequeue(&self) -> Option<FrontierEntry> {
        self.queue.pop().await
    }

    pub fn close(&self) {
        self.queue.close();
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of entries waiting for a fetch worker
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
