//! Page-by-page traversal of one listing URL
//!
//! The paginator drives the `PaginationState` machine for a single seed URL:
//! fetch a page, extract its records, ask the stop policy, then either wait
//! and move to the next page or finish. A fetch failure ends the traversal
//! but keeps the records of the pages already read.

use crate::crawler::fetcher::{pause, ResilientFetcher, Transport};
use crate::crawler::stop_policy::StopPolicy;
use crate::extract::RecordExtractor;
use crate::output::ListingRecord;
use crate::state::{PaginationPhase, PaginationState, StopReason};
use crate::url::{build_page_url, parse_absolute};
use crate::HarvestError;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of traversing one seed URL
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    /// The seed URL as given
    pub source_url: String,
    /// Records in page-then-document order
    pub records: Vec<ListingRecord>,
    /// Number of pages requested, the failing one included
    pub pages_visited: u32,
    /// Signal that ended the traversal
    pub stop_reason: StopReason,
}

/// Drives pagination for listing URLs, one at a time
pub struct Paginator<T = Client> {
    fetcher: ResilientFetcher<T>,
    extractor: RecordExtractor,
    policy: StopPolicy,
    page_delay: Duration,
    cancel: CancellationToken,
}

impl<T: Transport> Paginator<T> {
    pub fn new(
        fetcher: ResilientFetcher<T>,
        extractor: RecordExtractor,
        policy: StopPolicy,
        page_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            policy,
            page_delay,
            cancel,
        }
    }

    /// Walks every page of `seed` until a stop signal fires
    ///
    /// Page URLs are built by appending `page=N` to the seed. Relative links
    /// are resolved against the parsed seed URL, and the seed string itself
    /// is recorded verbatim as each record's source.
    ///
    /// # Errors
    ///
    /// Only a seed that is not an absolute HTTP(S) URL is an error. Network
    /// failures end the traversal with `StopReason::FetchFailed` instead.
    pub async fn paginate(&self, seed: &str) -> Result<PaginationOutcome, HarvestError> {
        let base_url = parse_absolute(seed)?;
        let mut state = PaginationState::new();
        let mut pages_visited = 0;

        while !state.phase().is_terminal() {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancelled before page {} of {}", state.page(), seed);
                state.finish(StopReason::Cancelled)?;
                break;
            }

            let page_url = build_page_url(seed, state.page())?;
            tracing::info!("Scraping page {}: {}", state.page(), page_url);
            pages_visited += 1;

            let page = match self.fetcher.fetch(&page_url).await {
                Ok(page) => page,
                Err(e) if e.is_cancelled() => {
                    tracing::info!("Fetch cancelled on page {}", state.page());
                    state.finish(StopReason::Cancelled)?;
                    break;
                }
                Err(e) => {
                    tracing::warn!("No response for page {}, ending pagination: {}", state.page(), e);
                    state.finish(StopReason::FetchFailed)?;
                    break;
                }
            };

            state.transition(PaginationPhase::Evaluating)?;
            let (records, signal) = self.evaluate_page(&page.body, &base_url, seed, state.page());
            let found = records.len();
            state.accept_page(records);

            if let Some(reason) = signal {
                log_stop(state.page(), reason);
                state.finish(reason)?;
                break;
            }

            tracing::info!(
                "Page {}: {} items (total: {})",
                state.page(),
                found,
                state.records().len()
            );

            if !pause(&self.cancel, self.page_delay).await {
                state.finish(StopReason::Cancelled)?;
                break;
            }
            state.advance()?;
        }

        let stop_reason = state.last_signal().unwrap_or(StopReason::Cancelled);
        Ok(PaginationOutcome {
            source_url: seed.to_string(),
            records: state.into_records(),
            pages_visited,
            stop_reason,
        })
    }

    /// Parses one page, extracts its records and checks the stop signals
    ///
    /// Kept synchronous so the parsed document never lives across an await.
    fn evaluate_page(
        &self,
        body: &str,
        base_url: &Url,
        source: &str,
        page: u32,
    ) -> (Vec<ListingRecord>, Option<StopReason>) {
        let document = Html::parse_document(body);
        let records = self.extractor.extract(&document, base_url, source);
        let signal = self.policy.evaluate(page, records.len(), &document);
        (records, signal)
    }
}

fn log_stop(page: u32, reason: StopReason) {
    match reason {
        StopReason::EmptyPage => tracing::info!("Page {} empty - stopping", page),
        StopReason::NoNextPage | StopReason::NextPageDisabled => {
            tracing::info!("No next page after page {} - end of pagination", page)
        }
        StopReason::TerminalMarker => {
            tracing::info!("Last page indicator found on page {}", page)
        }
        StopReason::PageCeiling => {
            tracing::warn!("Page ceiling reached at page {}, stopping", page)
        }
        other => tracing::info!("Stopping at page {}: {}", page, other),
    }
}
