//! Seekora: a polite, depth-bounded web crawler
//!
//! This crate discovers the pages reachable from a start URL, records the link
//! graph it observes, and accumulates a cross-site "vote" signal describing how
//! strongly sites endorse one another. Fetching is gated by robots.txt and runs
//! on a pool of concurrent workers feeding a parsing/aggregation stage.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Seekora operations
#[derive(Debug, Error)]
pub enum SeekoraError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Crawl worker failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error(
        "Insufficient parallelism: {available} hardware threads available, {required} required"
    )]
    InsufficientParallelism { available: usize, required: usize },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Seekora operations
pub type Result<T> = std::result::Result<T, SeekoraError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlResults};
pub use state::{PageState, ResultGraph, VoteTable};
pub use url::{site_root, vote_weight, SiteRelation, SiteRoot};
