//! Run statistics for a harvest
//!
//! The orchestrator records one [`UrlReport`] per seed URL. Partial failures
//! never surface as errors, so this report is where they become visible.

use crate::output::ResultEnvelope;
use crate::state::StopReason;
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of one seed URL
#[derive(Debug, Clone, PartialEq)]
pub struct UrlReport {
    /// Category the URL belongs to
    pub category: String,

    /// The seed URL as configured
    pub url: String,

    /// Number of pages fetched or attempted
    pub pages_visited: u32,

    /// Number of records contributed
    pub records: usize,

    /// Why pagination stopped, if it ran at all
    pub stop_reason: Option<StopReason>,

    /// Error that prevented pagination entirely
    pub error: Option<String>,
}

impl UrlReport {
    /// Returns true if the URL contributed nothing because of an error
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || (self.records == 0 && self.stop_reason == Some(StopReason::FetchFailed))
    }
}

/// Per-URL reports for a whole run
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    pub reports: Vec<UrlReport>,
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Reports for URLs that produced nothing because of an error
    pub fn failed_urls(&self) -> Vec<&UrlReport> {
        self.reports.iter().filter(|r| r.is_failure()).collect()
    }

    /// Total number of pages visited across all URLs
    pub fn total_pages(&self) -> u32 {
        self.reports.iter().map(|r| r.pages_visited).sum()
    }

    /// Count of traversals per stop reason
    pub fn stop_reasons(&self) -> HashMap<StopReason, usize> {
        let mut counts = HashMap::new();
        for reason in self.reports.iter().filter_map(|r| r.stop_reason) {
            *counts.entry(reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Prints run statistics to stdout in a human-readable format
pub fn print_statistics(envelope: &ResultEnvelope, stats: &RunStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Total Items: {}", envelope.total_items());
    println!("Pages Visited: {}", stats.total_pages());
    println!("Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Items by Category:");
    for (category, records) in envelope.categories() {
        println!("  {}: {}", category, records.len());
    }
    println!();

    let reasons = stats.stop_reasons();
    if !reasons.is_empty() {
        println!("Stop Reasons:");
        let mut reason_counts: Vec<_> = reasons.iter().collect();
        reason_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        for (reason, count) in reason_counts {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    let failed = stats.failed_urls();
    if !failed.is_empty() {
        println!("Failed URLs ({}):", failed.len());
        for report in failed {
            match &report.error {
                Some(error) => println!("  - [{}] {}: {}", report.category, report.url, error),
                None => println!("  - [{}] {}", report.category, report.url),
            }
        }
        println!();
    }
}
