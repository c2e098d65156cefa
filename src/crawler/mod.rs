//! Crawler module for listing harvesting
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with retry logic and politeness delays
//! - Stop signals for pagination
//! - Page-by-page traversal of one listing URL
//! - Overall run orchestration across categories

mod fetcher;
mod orchestrator;
mod pagination;
mod stop_policy;

pub use fetcher::{build_http_client, FetchedPage, RawResponse, ResilientFetcher, RetryPolicy, Transport};
pub use orchestrator::{HarvestRun, Orchestrator};
pub use pagination::{PaginationOutcome, Paginator};
pub use stop_policy::StopPolicy;

use crate::config::Config;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest of every configured category
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Paginate every URL of every category in order
/// 3. Return the envelope together with per-URL statistics
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `cancel` - Token that stops the run early; partial results are kept
///
/// # Returns
///
/// * `Ok(HarvestRun)` - Harvest completed, possibly with failed URLs
/// * `Err(HarvestError)` - The client or selectors could not be built
pub async fn harvest(config: &Config, cancel: CancellationToken) -> Result<HarvestRun, HarvestError> {
    let orchestrator = Orchestrator::from_config(config, cancel)?;
    Ok(orchestrator.run_with_statistics(&config.categories).await)
}
