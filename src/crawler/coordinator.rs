//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the engine that coordinates all aspects of a run:
//! - Validating the run parameters and seeding the frontier
//! - Spawning fetch and parse workers
//! - Detecting completion or cancellation and shutting the workers down
//! - Collecting the graph, votes and statistics

use crate::config::{available_parallelism, resolve_concurrency, validate, validate_depth, Config};
use crate::crawler::{
    aggregate_page, fetch_with_retry, CompletionCoordinator, CrawlPhase, FetchOutcome,
    FetchedPage, Frontier, FrontierEntry, HtmlLinkExtractor, HttpClient, LinkExtractor,
    ReqwestHttpClient, RetryPolicy, WorkQueue,
};
use crate::robots::RobotsCache;
use crate::state::{CrawlState, CrawlStatistics, PageState, ResultGraph, VoteTable};
use crate::url::{prepare_start_url, site_root};
use crate::SeekoraError;
use chrono::Utc;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a finished (or cancelled) run produced
#[derive(Debug, Clone)]
pub struct CrawlResults {
    pub graph: ResultGraph,
    pub votes: VoteTable,
    pub statistics: CrawlStatistics,
}

/// Depth-bounded concurrent crawl engine
///
/// One engine can perform several runs; every run gets fresh state.
pub struct CrawlEngine {
    config: Config,
    client: Arc<dyn HttpClient>,
    extractor: Arc<dyn LinkExtractor>,
    phase: Arc<watch::Sender<CrawlPhase>>,
}

impl CrawlEngine {
    /// Creates an engine around the given collaborators
    pub fn new(
        config: Config,
        client: Arc<dyn HttpClient>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        let (phase, _) = watch::channel(CrawlPhase::Done);
        Self {
            config,
            client,
            extractor,
            phase: Arc::new(phase),
        }
    }

    /// Creates an engine using reqwest and the HTML extractor
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to run
    /// * `Err(SeekoraError)` - The HTTP client could not be built
    pub fn from_config(config: Config) -> Result<Self, SeekoraError> {
        let client = ReqwestHttpClient::new(&config.user_agent, &config.retry)?;
        Ok(Self::new(
            config,
            Arc::new(client),
            Arc::new(HtmlLinkExtractor::new()),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Observes the phase of the current (or last) run
    pub fn subscribe_phase(&self) -> watch::Receiver<CrawlPhase> {
        self.phase.subscribe()
    }

    /// Crawls from `start_url` down to `max_depth` (the start URL is depth 1)
    ///
    /// Per-URL failures never fail the run; they show up in the statistics.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResults)` - The graph, votes and statistics of the run
    /// * `Err(SeekoraError)` - Invalid start URL, depth or configuration, or a
    ///   crawl worker died
    pub async fn run(&self, start_url: &str, max_depth: u32) -> Result<CrawlResults, SeekoraError> {
        self.run_with_cancellation(start_url, max_depth, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), stopping early when `cancel` fires
    ///
    /// After cancellation in-flight requests are abandoned, queued work is
    /// recorded as cancelled, and whatever was applied so far is returned.
    /// Each page's edges and votes are applied whole or not at all.
    ///
    /// A panic while fetching or parsing one page marks that page `Failed`
    /// and the run continues. If a worker itself dies, the run stops and
    /// returns `SeekoraError::Worker`.
    pub async fn run_with_cancellation(
        &self,
        start_url: &str,
        max_depth: u32,
        cancel: CancellationToken,
    ) -> Result<CrawlResults, SeekoraError> {
        validate(&self.config)?;
        validate_depth(max_depth)?;
        let start = prepare_start_url(start_url)?;
        let fetch_workers = resolve_concurrency(&self.config.crawler, available_parallelism())?;
        let parser_workers = self.config.crawler.parser_workers.max(1) as usize;

        // Cancelled by the caller, or internally when a worker dies.
        let run_cancel = cancel.child_token();
        let ctx = Arc::new(RunContext {
            state: CrawlState::new(
                Frontier::new(max_depth),
                RobotsCache::new(Arc::clone(&self.client), self.config.robots.on_failure),
            ),
            content: WorkQueue::new(),
            completion: CompletionCoordinator::with_sender(Arc::clone(&self.phase)),
            client: Arc::clone(&self.client),
            extractor: Arc::clone(&self.extractor),
            policy: RetryPolicy::from_config(&self.config.retry),
            cancel: run_cancel.clone(),
            progress_interval: self.config.crawler.progress_interval,
            started: Instant::now(),
        });

        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (max depth {}, {} fetch workers, {} parser workers)",
            start,
            max_depth,
            fetch_workers,
            parser_workers
        );

        let seed = start.to_string();
        if ctx.state.frontier.try_claim(&seed, 1) {
            ctx.completion.unit_started();
            ctx.state.frontier.enqueue(seed, 1);
        }

        let mut workers = JoinSet::new();
        for id in 0..fetch_workers {
            workers.spawn(fetch_worker(Arc::clone(&ctx), id));
        }
        for id in 0..parser_workers {
            workers.spawn(parse_worker(Arc::clone(&ctx), id));
        }

        let ending = tokio::select! {
            _ = ctx.completion.wait_done() => RunEnding::Completed,
            _ = cancel.cancelled() => {
                tracing::info!("Cancellation requested, stopping workers");
                RunEnding::Cancelled
            }
            Some(Err(e)) = workers.join_next() => {
                tracing::error!("Crawl worker failed, stopping the run: {}", e);
                run_cancel.cancel();
                RunEnding::WorkerFailed(e.to_string())
            }
        };

        ctx.state.frontier.close();
        ctx.content.close();

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
            }
        }
        ctx.completion.finish();

        let cancelled = ending == RunEnding::Cancelled;
        if let RunEnding::WorkerFailed(reason) = ending {
            return Err(SeekoraError::Worker(reason));
        }

        let (graph, votes) = ctx.state.results.snapshot();
        let statistics = ctx.state.stats.snapshot(
            started_at,
            Utc::now(),
            ctx.state.robots.failed_count() as u64,
            cancelled,
        );

        tracing::info!(
            "Crawl {}: {} pages fetched, {} URLs claimed, {} site roots voted for in {:?}",
            if cancelled { "cancelled" } else { "completed" },
            graph.len(),
            ctx.state.frontier.visited_count(),
            votes.len(),
            ctx.started.elapsed()
        );

        Ok(CrawlResults {
            graph,
            votes,
            statistics,
        })
    }
}

/// Why the coordinator stopped waiting on a run
#[derive(Debug, PartialEq, Eq)]
enum RunEnding {
    Completed,
    Cancelled,
    WorkerFailed(String),
}

/// Run-scoped state and collaborators shared by all workers
struct RunContext {
    state: CrawlState,
    content: WorkQueue<FetchedPage>,
    completion: CompletionCoordinator,
    client: Arc<dyn HttpClient>,
    extractor: Arc<dyn LinkExtractor>,
    policy: RetryPolicy,
    cancel: CancellationToken,
    progress_interval: u64,
    started: Instant,
}

impl RunContext {
    /// Fetches one claimed URL
    ///
    /// Returns `None` when the content was handed to the parse stage, which
    /// then owns the unit; otherwise the unit's terminal state.
    async fn fetch_entry(&self, entry: FrontierEntry) -> Option<PageState> {
        if self.cancel.is_cancelled() {
            return Some(PageState::Cancelled);
        }

        let root = match Url::parse(&entry.url).ok().as_ref().and_then(site_root) {
            Some(root) => root,
            None => {
                tracing::debug!("Cannot derive site root for {}", entry.url);
                return Some(PageState::Failed);
            }
        };

        if !self.state.robots.is_allowed(&root, &entry.url).await {
            tracing::debug!("URL {} disallowed by robots.txt", entry.url);
            return Some(PageState::Disallowed);
        }

        let outcome =
            fetch_with_retry(self.client.as_ref(), &entry.url, &self.policy, &self.cancel).await;
        self.state
            .stats
            .record_retries(u64::from(outcome.attempts().saturating_sub(1)));

        match outcome {
            FetchOutcome::Success { body, .. } => {
                tracing::debug!("Fetched {} (depth {})", entry.url, entry.depth);
                let page = FetchedPage {
                    url: entry.url,
                    content: body,
                    depth: entry.depth,
                };
                if self.content.push(page) {
                    None
                } else {
                    Some(PageState::Cancelled)
                }
            }
            FetchOutcome::Abandoned {
                state,
                attempts,
                reason,
            } => {
                tracing::warn!(
                    "Abandoning {} after {} attempt(s): {}",
                    entry.url,
                    attempts,
                    reason
                );
                Some(state)
            }
            FetchOutcome::Cancelled { .. } => Some(PageState::Cancelled),
        }
    }

    /// Records a page's edges and votes, then claims the links worth following
    fn parse_page(&self, page: FetchedPage) {
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            aggregate_page(&page, self.extractor.as_ref())
        }));
        let update = match extracted {
            Ok(update) => update,
            Err(_) => {
                tracing::error!("Link extraction panicked on {}", page.url);
                self.finish_unit(&page.url, PageState::Failed);
                return;
            }
        };
        let next_depth = page.depth + 1;

        let follow: Vec<String> = if self.state.frontier.depth_allowed(next_depth) {
            update.edges.iter().map(|edge| edge.target.clone()).collect()
        } else {
            Vec::new()
        };

        tracing::debug!("Parsed {}: {} links", page.url, update.edges.len());
        self.state.stats.record_links(update.edges.len());
        self.state.results.apply(update);

        for target in follow {
            if !self.state.frontier.try_claim(&target, next_depth) {
                continue;
            }

            // Counted before the parent finishes so in-flight never dips to zero early.
            self.completion.unit_started();
            if !self.state.frontier.enqueue(target, next_depth) {
                self.state.stats.record(PageState::Cancelled);
                self.completion.unit_finished();
            }
        }

        self.finish_unit(&page.url, PageState::Processed);
    }

    fn finish_unit(&self, url: &str, state: PageState) {
        self.state.stats.record(state);
        tracing::trace!("{} finished as {}", url, state);

        let remaining = self.completion.unit_finished();
        self.report_progress();

        if remaining == 0 {
            let phase = self
                .completion
                .try_complete(self.state.frontier.is_empty(), self.content.is_empty());
            tracing::debug!("No units in flight, crawl phase is now {:?}", phase);
        }
    }

    fn report_progress(&self) {
        if self.progress_interval == 0 {
            return;
        }

        let completed = self.state.stats.completed();
        if completed % self.progress_interval != 0 {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            completed as f64 / elapsed
        } else {
            0.0
        };
        tracing::info!(
            "Progress: {} pages completed, {} in frontier, {} in flight, {:.2} pages/sec",
            completed,
            self.state.frontier.len(),
            self.completion.in_flight(),
            rate
        );
    }
}

async fn fetch_worker(ctx: Arc<RunContext>, id: usize) {
    tracing::trace!("Fetch worker {} started", id);

    while let Some(entry) = ctx.state.frontier.wait_dequeue().await {
        let url = entry.url.clone();

        // A panicking client must still release its unit, or the run never completes.
        let task = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.fetch_entry(entry).await })
        };
        match task.await {
            Ok(Some(state)) => ctx.finish_unit(&url, state),
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Fetching {} failed: {}", url, e);
                ctx.finish_unit(&url, PageState::Failed);
            }
        }
    }

    tracing::trace!("Fetch worker {} stopped", id);
}

async fn parse_worker(ctx: Arc<RunContext>, id: usize) {
    tracing::trace!("Parse worker {} started", id);

    while let Some(page) = ctx.content.pop().await {
        ctx.parse_page(page);
    }

    tracing::trace!("Parse worker {} stopped", id);
}
