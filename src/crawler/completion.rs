//! Completion detection for a crawl run
//!
//! A unit of work is one claimed URL. It is counted from the moment it is
//! claimed until it has been fetched and parsed (or abandoned). Children are
//! counted before their parent finishes, so the count can only reach zero
//! once no unit can produce more work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of a crawl run as seen by its workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Work remains in the frontier, the content queue or in flight
    Running,
    /// The in-flight count hit zero and the queues are being verified
    Draining,
    /// No work remains anywhere; workers exit
    Done,
}

/// Tracks in-flight units and publishes the crawl phase
#[derive(Debug)]
pub struct CompletionCoordinator {
    in_flight: AtomicUsize,
    phase: Arc<watch::Sender<CrawlPhase>>,
}

impl Default for CompletionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionCoordinator {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(CrawlPhase::Running);
        Self::with_sender(Arc::new(phase))
    }

    /// Publishes through an existing channel, resetting it to `Running`
    pub fn with_sender(phase: Arc<watch::Sender<CrawlPhase>>) -> Self {
        phase.send_replace(CrawlPhase::Running);
        Self {
            in_flight: AtomicUsize::new(0),
            phase,
        }
    }

    /// Counts a newly claimed unit
    pub fn unit_started(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks a unit as fully processed and returns the remaining count
    pub fn unit_finished(&self) -> usize {
        let previous = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "unit_finished without matching unit_started");
        previous.saturating_sub(1)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Attempts the transition to `Done`
    ///
    /// Done requires the frontier and the content queue to be empty and no
    /// unit to be in flight. Returns the resulting phase.
    pub fn try_complete(&self, frontier_empty: bool, content_empty: bool) -> CrawlPhase {
        if self.phase() == CrawlPhase::Done {
            return CrawlPhase::Done;
        }
        if self.in_flight() != 0 {
            return self.phase();
        }

        self.phase.send_replace(CrawlPhase::Draining);

        let next = if frontier_empty && content_empty && self.in_flight() == 0 {
            CrawlPhase::Done
        } else {
            CrawlPhase::Running
        };
        self.phase.send_replace(next);
        next
    }

    /// Forces the `Done` phase (used when a run is cancelled)
    pub fn finish(&self) {
        self.phase.send_replace(CrawlPhase::Done);
    }

    pub fn phase(&self) -> CrawlPhase {
        *self.phase.borrow()
    }

    /// Subscribes to phase changes
    pub fn subscribe(&self) -> watch::Receiver<CrawlPhase> {
        self.phase.subscribe()
    }

    /// Waits until the phase becomes `Done`
    pub async fn wait_done(&self) {
        let mut receiver = self.phase.subscribe();
        // The sender lives as long as `self`, so this only ends at Done.
        let _ = receiver.wait_for(|phase| *phase == CrawlPhase::Done).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_running() {
        let coordinator = CompletionCoordinator::new();
        assert_eq!(coordinator.phase(), CrawlPhase::Running);
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[test]
    fn test_not_done_while_in_flight() {
        let coordinator = CompletionCoordinator::new();
        coordinator.unit_started();
        assert_eq!(coordinator.try_complete(true, true), CrawlPhase::Running);
    }

    #[test]
    fn test_not_done_with_queued_work() {
        let coordinator = CompletionCoordinator::new();
        assert_eq!(coordinator.try_complete(false, true), CrawlPhase::Running);
        assert_eq!(coordinator.try_complete(true, false), CrawlPhase::Running);
        assert_eq!(coordinator.phase(), CrawlPhase::Running);
    }

    #[test]
    fn test_done_when_everything_idle() {
        let coordinator = CompletionCoordinator::new();
        coordinator.unit_started();
        coordinator.unit_started();
        assert_eq!(coordinator.unit_finished(), 1);
        assert_eq!(coordinator.unit_finished(), 0);
        assert_eq!(coordinator.try_complete(true, true), CrawlPhase::Done);
        assert_eq!(coordinator.phase(), CrawlPhase::Done);
    }

    #[test]
    fn test_done_is_sticky() {
        let coordinator = CompletionCoordinator::new();
        coordinator.finish();
        assert_eq!(coordinator.try_complete(false, false), CrawlPhase::Done);
    }

    #[test]
    fn test_shared_sender_is_reset() {
        let (sender, receiver) = watch::channel(CrawlPhase::Done);
        let coordinator = CompletionCoordinator::with_sender(Arc::new(sender));
        assert_eq!(*receiver.borrow(), CrawlPhase::Running);
        assert_eq!(coordinator.phase(), CrawlPhase::Running);
    }

    #[tokio::test]
    async fn test_subscribers_observe_done() {
        let coordinator = Arc::new(CompletionCoordinator::new());
        let mut receiver = coordinator.subscribe();
        coordinator.unit_started();

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.wait_done().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator.unit_finished();
        coordinator.try_complete(true, true);

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*receiver.borrow_and_update(), CrawlPhase::Done);
    }
}
