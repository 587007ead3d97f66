use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Seekora
///
/// Every section and key has a default, so an empty file (or no file at all)
/// yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl; the start URL is depth 1
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent fetch workers (defaults to available parallelism)
    #[serde(default)]
    pub concurrency: Option<u32>,

    /// Hardware threads below which the parallelism guard trips
    #[serde(rename = "min-parallelism", default = "default_min_parallelism")]
    pub min_parallelism: u32,

    /// Fail fast instead of degrading to one worker when the guard trips
    #[serde(rename = "strict-parallelism", default)]
    pub strict_parallelism: bool,

    /// Number of parser/aggregator workers
    #[serde(rename = "parser-workers", default = "default_parser_workers")]
    pub parser_workers: u32,

    /// Log progress every N completed units (0 disables progress logging)
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrency: None,
            min_parallelism: default_min_parallelism(),
            strict_parallelism: false,
            parser_workers: default_parser_workers(),
            progress_interval: default_progress_interval(),
        }
    }
}

/// Backoff strategy applied between fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffStrategy {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles with every retry, up to `max-backoff-ms`
    Exponential,
}

/// Retry and timeout configuration for page fetches
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per URL, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts (milliseconds)
    #[serde(rename = "backoff-ms", default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default)]
    pub backoff: BackoffStrategy,

    /// Upper bound for exponential backoff (milliseconds)
    #[serde(rename = "max-backoff-ms", default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Per-attempt request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,
}

impl RetryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            backoff: BackoffStrategy::default(),
            max_backoff_ms: default_max_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// What to do with a site whose robots.txt could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RobotsFailurePolicy {
    /// Treat every URL on the site as disallowed
    #[default]
    Deny,
    /// Treat every URL on the site as allowed
    Allow,
}

/// Robots.txt handling configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RobotsConfig {
    #[serde(rename = "on-failure", default)]
    pub on_failure: RobotsFailurePolicy,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the identifying token sent with every request
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `crawl_paths.json` and `vote_counts.json`
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_min_parallelism() -> u32 {
    1
}

fn default_parser_workers() -> u32 {
    1
}

fn default_progress_interval() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    5000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_crawler_name() -> String {
    "Seekora".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_output_directory() -> String {
    "./crawl_results".to_string()
}
