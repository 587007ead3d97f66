//! JSON result files
//!
//! `crawl_paths.json` mirrors the result graph and `vote_counts.json` mirrors
//! the vote table. Both maps are ordered, so identical runs write identical
//! files.

use crate::crawler::CrawlResults;
use crate::output::{OutputError, OutputResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CRAWL_PATHS_FILE: &str = "crawl_paths.json";
pub const VOTE_COUNTS_FILE: &str = "vote_counts.json";

/// Locations of the files written by [`write_results`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaths {
    pub crawl_paths: PathBuf,
    pub vote_counts: PathBuf,
}

/// Writes the graph and vote table into `dir`, creating it if absent
///
/// # Arguments
///
/// * `results` - The results of a run
/// * `dir` - Output directory (for example `./crawl_results`)
///
/// # Returns
///
/// * `Ok(ResultPaths)` - Where the two files were written
/// * `Err(OutputError)` - The directory or a file could not be written
pub fn write_results(results: &CrawlResults, dir: impl AsRef<Path>) -> OutputResult<ResultPaths> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.display().to_string(),
        source,
    })?;

    let paths = ResultPaths {
        crawl_paths: dir.join(CRAWL_PATHS_FILE),
        vote_counts: dir.join(VOTE_COUNTS_FILE),
    };

    write_json(&paths.crawl_paths, &results.graph)?;
    write_json(&paths.vote_counts, &results.votes)?;

    tracing::info!(
        "Wrote {} pages to {} and {} site roots to {}",
        results.graph.len(),
        paths.crawl_paths.display(),
        results.votes.len(),
        paths.vote_counts.display()
    );

    Ok(paths)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> OutputResult<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    fs::write(path, json).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })
}
