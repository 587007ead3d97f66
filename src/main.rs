//! Seekora main entry point
//!
//! This is the command-line interface for the Seekora crawler.

use anyhow::{bail, Context, Result};
use clap::Parser;
use seekora::config::{load_config_with_hash, validate_depth, Config, RobotsFailurePolicy};
use seekora::crawler::CrawlEngine;
use seekora::output::{print_statistics, write_results};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Seekora: a polite, depth-bounded web crawler
///
/// Seekora crawls outward from a start URL while respecting robots.txt,
/// records every link it sees, and tallies how strongly sites vote for one
/// another. Without a URL it asks for one interactively.
#[derive(Parser, Debug)]
#[command(name = "seekora")]
#[command(version)]
#[command(about = "A polite, depth-bounded web crawler", long_about = None)]
struct Cli {
    /// Start URL (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Crawl depth; the start URL is depth 1
    #[arg(short, long)]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory for crawl_paths.json and vote_counts.json
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Number of concurrent fetch workers
    #[arg(short = 'j', long)]
    concurrency: Option<u32>,

    /// Crawl sites whose robots.txt cannot be fetched
    #[arg(long)]
    allow_on_robots_failure: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    let (start_url, depth) = match cli.url.clone() {
        Some(url) => (url, cli.depth.unwrap_or(config.crawler.max_depth)),
        None => match prompt_for_crawl(cli.depth)? {
            Some(request) => request,
            None => return Ok(()),
        },
    };
    validate_depth(depth).context("Invalid crawl depth")?;

    let output_dir = config.output.directory.clone();
    let engine = CrawlEngine::from_config(config).context("Failed to build the crawler")?;

    // Ctrl-C stops the crawl; whatever was gathered is still written.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing with partial results");
                cancel.cancel();
            }
        });
    }

    let start_time = Instant::now();
    let results = engine
        .run_with_cancellation(&start_url, depth, cancel)
        .await
        .with_context(|| format!("Crawl of {} could not start", start_url))?;
    let total_time = start_time.elapsed();

    println!(
        "\nCrawling completed in {:.2} seconds.\n",
        total_time.as_secs_f64()
    );
    if !cli.quiet {
        print_statistics(&results.statistics);
        println!();
    }

    let paths = write_results(&results, &output_dir)
        .with_context(|| format!("Failed to write results to {}", output_dir))?;
    println!("Crawl results saved to '{}'.", paths.crawl_paths.display());
    println!("Vote counts saved to '{}'.", paths.vote_counts.display());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seekora=info,warn"),
            1 => EnvFilter::new("seekora=debug,info"),
            2 => EnvFilter::new("seekora=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = Some(concurrency);
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }
    if cli.allow_on_robots_failure {
        config.robots.on_failure = RobotsFailurePolicy::Allow;
    }
}

/// Runs the interactive menu
///
/// Returns `None` when the user chooses to exit.
fn prompt_for_crawl(depth: Option<u32>) -> Result<Option<(String, u32)>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("Welcome to the Seekora web crawler.");
    println!("What do you want to do?");
    println!("1 - crawl websites");
    println!("2 - exit");
    let choice = prompt(&mut input, "Enter your choice: ")?;
    if choice == "2" {
        return Ok(None);
    }

    println!("To crawl websites, we need a starting point.");
    let url = loop {
        let url = prompt(&mut input, "What website would you like to start with: ")?;
        if !url.is_empty() {
            break url;
        }
    };

    let depth = match depth {
        Some(depth) => depth,
        None => loop {
            let answer = prompt(&mut input, "How deep should the crawl go (generations)? ")?;
            match answer.parse::<u32>() {
                Ok(depth) if depth >= 1 => break depth,
                _ => println!("Please enter a whole number of at least 1."),
            }
        },
    };

    Ok(Some((url, depth)))
}

fn prompt(input: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input closed before an answer was given");
    }
    Ok(line.trim().to_string())
}
