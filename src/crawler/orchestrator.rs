//! Harvest orchestration - category loop and result aggregation
//!
//! This module drives a whole run, including:
//! - Building the fetcher, extractor and stop policy from configuration
//! - Walking every configured category and its listing URLs in order
//! - Collecting records into the result envelope
//! - Reporting per-URL outcomes without letting one URL abort the run

use crate::config::{CategoryEntry, Config};
use crate::crawler::fetcher::{build_http_client, ResilientFetcher, RetryPolicy, Transport};
use crate::crawler::pagination::Paginator;
use crate::crawler::stop_policy::StopPolicy;
use crate::extract::RecordExtractor;
use crate::output::{ResultEnvelope, RunStatistics, UrlReport};
use crate::HarvestError;
use chrono::Utc;
use reqwest::Client;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Envelope and per-URL statistics of one run
#[derive(Debug)]
pub struct HarvestRun {
    pub envelope: ResultEnvelope,
    pub statistics: RunStatistics,
}

/// Runs the harvest for a list of categories
pub struct Orchestrator<T = Client> {
    paginator: Paginator<T>,
    cancel: CancellationToken,
}

impl Orchestrator<Client> {
    /// Creates an orchestrator backed by a real HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `cancel` - Token that stops the run between and during requests
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or a selector could not be built
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.http)?;
        Self::with_transport(client, config, cancel)
    }
}

impl<T: Transport> Orchestrator<T> {
    /// Creates an orchestrator on top of an arbitrary transport
    pub fn with_transport(
        transport: T,
        config: &Config,
        cancel: CancellationToken,
    ) -> Result<Self, HarvestError> {
        let fetcher = ResilientFetcher::new(
            transport,
            RetryPolicy::from(&config.fetch),
            cancel.clone(),
        );
        let extractor = RecordExtractor::new(config.extraction.max_items_per_page)?;
        let policy = StopPolicy::from_config(&config.pagination)?;

        let paginator = Paginator::new(
            fetcher,
            extractor,
            policy,
            config.pagination.page_delay(),
            cancel.clone(),
        );

        Ok(Self { paginator, cancel })
    }

    /// Harvests every category and returns the aggregated envelope
    pub async fn run(&self, categories: &[CategoryEntry]) -> ResultEnvelope {
        self.run_with_statistics(categories).await.envelope
    }

    /// Harvests every category, also returning per-URL reports
    ///
    /// Categories are processed in the given order and their URLs one after
    /// another. Every category gets a bucket in the envelope, even one whose
    /// URLs all failed or that was never reached because the run was
    /// cancelled. An invalid seed URL is logged and reported; the run goes on
    /// with the next one.
    pub async fn run_with_statistics(&self, categories: &[CategoryEntry]) -> HarvestRun {
        let started = Instant::now();
        let mut envelope = ResultEnvelope::new(Utc::now());
        let mut statistics = RunStatistics::default();

        for category in categories {
            envelope.ensure_category(&category.name);
        }

        'categories: for category in categories {
            tracing::info!(
                "=== Category: {} ({} URLs) ===",
                category.name,
                category.urls.len()
            );

            for url in &category.urls {
                if self.cancel.is_cancelled() {
                    tracing::warn!("Run cancelled, skipping remaining URLs");
                    break 'categories;
                }

                let report = match self.paginator.paginate(url).await {
                    Ok(outcome) => {
                        tracing::info!(
                            "{}: {} records from {} pages ({})",
                            url,
                            outcome.records.len(),
                            outcome.pages_visited,
                            outcome.stop_reason
                        );
                        let report = UrlReport {
                            category: category.name.clone(),
                            url: url.clone(),
                            pages_visited: outcome.pages_visited,
                            records: outcome.records.len(),
                            stop_reason: Some(outcome.stop_reason),
                            error: None,
                        };
                        envelope.extend_category(&category.name, outcome.records);
                        report
                    }
                    Err(e) => {
                        tracing::warn!("Skipping {} in category {}: {}", url, category.name, e);
                        UrlReport {
                            category: category.name.clone(),
                            url: url.clone(),
                            pages_visited: 0,
                            records: 0,
                            stop_reason: None,
                            error: Some(e.to_string()),
                        }
                    }
                };
                statistics.reports.push(report);
            }
        }

        statistics.elapsed = started.elapsed();
        tracing::info!(
            "Harvest finished: {} items in {} categories ({:.1}s)",
            envelope.total_items(),
            categories.len(),
            statistics.elapsed.as_secs_f64()
        );

        HarvestRun {
            envelope,
            statistics,
        }
    }
}
