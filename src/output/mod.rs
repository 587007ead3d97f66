//! Output module for persisting and reporting crawl results
//!
//! This module handles:
//! - Writing the link graph and vote table as JSON files
//! - Rendering run statistics for the command line

mod json;
pub mod stats;

pub use json::{write_results, ResultPaths, CRAWL_PATHS_FILE, VOTE_COUNTS_FILE};
pub use stats::{format_statistics, print_statistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
