use crate::config::types::CrawlerConfig;
use crate::ConfigError;

/// Returns the number of hardware threads available to this process
///
/// Falls back to 1 when the platform cannot report it.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Resolves the number of fetch workers for a run
///
/// The configured concurrency wins when present, otherwise the available
/// parallelism is used. When `available` is below `min_parallelism` the guard
/// trips: strict mode fails fast, otherwise the crawl degrades to one worker.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `available` - Hardware threads available (see [`available_parallelism`])
///
/// # Returns
///
/// * `Ok(usize)` - Number of fetch workers, always >= 1
/// * `Err(ConfigError)` - The guard tripped in strict mode
pub fn resolve_concurrency(config: &CrawlerConfig, available: usize) -> Result<usize, ConfigError> {
    let required = config.min_parallelism as usize;

    if available < required {
        if config.strict_parallelism {
            return Err(ConfigError::InsufficientParallelism {
                available,
                required,
            });
        }

        tracing::warn!(
            "Only {} hardware threads available ({} required); running with a single fetch worker",
            available,
            required
        );
        return Ok(1);
    }

    let workers = config
        .concurrency
        .map(|c| c as usize)
        .unwrap_or(available);

    Ok(workers.max(1))
}
