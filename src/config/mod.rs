//! Configuration module for Seekora
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving the fetch concurrency against the host's parallelism.
//!
//! # Example
//!
//! ```no_run
//! use seekora::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("seekora.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parallelism;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackoffStrategy, Config, CrawlerConfig, OutputConfig, RetryConfig, RobotsConfig,
    RobotsFailurePolicy, UserAgentConfig,
};

// Re-export parser functions
pub use parallelism::{available_parallelism, resolve_concurrency};
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_depth};
