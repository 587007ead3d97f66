//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier with its visited set and the stage queues
//! - HTTP fetching with retry logic
//! - HTML link extraction and edge/vote aggregation
//! - Completion detection and overall crawl coordination

mod aggregator;
mod completion;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod retry;

pub use aggregator::{aggregate_page, FetchedPage};
pub use completion::{CompletionCoordinator, CrawlPhase};
pub use coordinator::{CrawlEngine, CrawlResults};
pub use fetcher::{
    build_http_client, fetch_with_retry, FetchOutcome, HttpClient, HttpResponse,
    ReqwestHttpClient, TransportError,
};
pub use frontier::{Frontier, FrontierEntry, WorkQueue};
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use retry::{AttemptOutcome, Backoff, RetryPolicy};

use crate::config::Config;

/// Runs a complete crawl with the default collaborators
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and link extractor
/// 2. Seed the frontier with the start URL
/// 3. Fetch, parse and follow links down to `max_depth`
/// 4. Return the link graph, vote table and statistics
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `start_url` - Where to start; `https://` is assumed when no scheme is given
/// * `max_depth` - Deepest level to fetch (the start URL is depth 1)
pub async fn crawl(
    config: Config,
    start_url: &str,
    max_depth: u32,
) -> crate::Result<CrawlResults> {
    CrawlEngine::from_config(config)?
        .run(start_url, max_depth)
        .await
}
