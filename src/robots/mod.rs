//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Every URL is checked against its site root's rules before it is fetched.

mod cache;
mod parser;

pub use cache::{RobotsCache, RobotsEntry, RobotsStatus};
pub use parser::ParsedRobots;

use crate::crawler::HttpClient;
use crate::url::SiteRoot;

/// User agent token used when matching robots.txt groups
pub const WILDCARD_AGENT: &str = "*";

/// Fetches robots.txt for a site root with a single best-effort attempt
///
/// A 2xx response is parsed. A 404 or 410 means the site publishes no rules
/// and everything is allowed. Any other status or a transport error marks the
/// root as failed; the caller's failure policy decides what that means.
///
/// # Arguments
///
/// * `client` - The HTTP client (carries the identifying user agent)
/// * `root` - The site root whose robots.txt should be fetched
pub async fn fetch_robots(client: &dyn HttpClient, root: &SiteRoot) -> RobotsEntry {
    let robots_url = root.robots_url();
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    match client.get(&robots_url).await {
        Ok(response) if response.is_success() => {
            RobotsEntry::fetched(ParsedRobots::from_content(&response.body))
        }
        Ok(response) if response.status == 404 || response.status == 410 => {
            tracing::debug!("No robots.txt at {} ({}), allowing all", robots_url, response.status);
            RobotsEntry::fetched(ParsedRobots::allow_all())
        }
        Ok(response) => {
            tracing::warn!(
                "Error fetching robots.txt from {}: HTTP {}",
                robots_url,
                response.status
            );
            RobotsEntry::failed()
        }
        Err(e) => {
            tracing::warn!("Error fetching robots.txt from {}: {}", robots_url, e);
            RobotsEntry::failed()
        }
    }
}
