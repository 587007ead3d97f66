//! Statistics rendering
//!
//! This module formats the statistics of a finished run for the terminal.

use crate::state::{CrawlStatistics, PageState};
use std::fmt::Write;

/// Renders statistics as a human readable report
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Pages completed: {}", stats.total_pages);
    let _ = writeln!(out, "  Links discovered: {}", stats.links_discovered);
    let _ = writeln!(out, "  Retries: {}", stats.retries);
    let _ = writeln!(out, "  Robots.txt failures: {}", stats.robots_failures);
    let _ = writeln!(
        out,
        "  Duration: {:.1}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    if stats.cancelled {
        let _ = writeln!(out, "  Run was cancelled; results are partial");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages by State:");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (state, count) in state_counts {
        let percentage = if stats.total_pages > 0 {
            (*count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", state, count, percentage);
    }
    let _ = writeln!(out);

    // Calculate success rate
    let processed = stats.count(PageState::Processed);
    let success_rate = if stats.total_pages > 0 {
        (processed as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        success_rate, processed, stats.total_pages
    );

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CrawlStats;
    use chrono::Utc;

    #[test]
    fn test_format_statistics() {
        let stats = CrawlStats::new();
        for _ in 0..3 {
            stats.record(PageState::Processed);
        }
        stats.record(PageState::DeadLink);
        stats.record_links(12);

        let now = Utc::now();
        let report = format_statistics(&stats.snapshot(now, now, 0, false));

        assert!(report.contains("Pages completed: 4"));
        assert!(report.contains("Links discovered: 12"));
        assert!(report.contains("processed: 3 (75.0%)"));
        assert!(report.contains("dead_link: 1 (25.0%)"));
        assert!(report.contains("Success Rate: 75.0% (3 / 4"));
        assert!(!report.contains("cancelled"));
    }

    #[test]
    fn test_format_cancelled_empty_run() {
        let now = Utc::now();
        let report = format_statistics(&CrawlStats::new().snapshot(now, now, 1, true));

        assert!(report.contains("Run was cancelled"));
        assert!(report.contains("Robots.txt failures: 1"));
        assert!(report.contains("Success Rate: 0.0% (0 / 0"));
    }
}
