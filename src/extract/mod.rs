//! Record extraction from listing pages
//!
//! This module turns a parsed listing page into [`ListingRecord`]s:
//! - A chain of candidate strategies finds the listing elements
//! - Field probes pull the title, link and descriptive fields out of each one
//! - The amount normalizer turns revenue and price text into integers

mod amount;
mod fields;
mod strategy;

pub use amount::normalize_amount;
pub use fields::{element_text, FieldProbes};
pub use strategy::{default_strategies, CandidateSource, SelectorGroup};

use crate::output::ListingRecord;
use crate::ExtractError;
use chrono::Utc;
use scraper::{ElementRef, Html};
use url::Url;

/// Extracts listing records from a parsed page
pub struct RecordExtractor {
    strategies: Vec<Box<dyn CandidateSource>>,
    probes: FieldProbes,
    max_items: usize,
}

impl RecordExtractor {
    /// Creates an extractor with the default strategy chain
    ///
    /// # Arguments
    ///
    /// * `max_items` - Maximum number of candidates processed per page
    pub fn new(max_items: usize) -> Result<Self, ExtractError> {
        Self::with_strategies(default_strategies()?, max_items)
    }

    /// Creates an extractor with a custom strategy chain
    pub fn with_strategies(
        strategies: Vec<Box<dyn CandidateSource>>,
        max_items: usize,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            strategies,
            probes: FieldProbes::new()?,
            max_items,
        })
    }

    /// Extracts records from `document`
    ///
    /// Strategies are consulted in order; the first one that yields at least
    /// one element wins and the rest are never asked. At most `max_items`
    /// candidates of the winning strategy are processed. A candidate whose
    /// fields cannot be read is skipped without affecting the others.
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed listing page
    /// * `base_url` - URL against which relative links are resolved
    /// * `source` - Recorded verbatim as each record's source
    ///
    /// # Example
    ///
    /// ```
    /// use listing_harvest::RecordExtractor;
    /// use scraper::Html;
    /// use url::Url;
    ///
    /// let html = Html::parse_document(
    ///     r#"<div class="annonce-item"><a href="/a/1">Garage</a></div>"#,
    /// );
    /// let base = Url::parse("https://example.com/annonces").unwrap();
    /// let records = RecordExtractor::new(50)
    ///     .unwrap()
    ///     .extract(&html, &base, "https://example.com/annonces");
    /// assert_eq!(records[0].title, "Garage");
    /// assert_eq!(records[0].url.as_deref(), Some("https://example.com/a/1"));
    /// ```
    pub fn extract(&self, document: &Html, base_url: &Url, source: &str) -> Vec<ListingRecord> {
        let Some(candidates) = self.select_candidates(document) else {
            tracing::warn!("No listing elements found on {}", base_url);
            return Vec::new();
        };

        let mut records = Vec::with_capacity(candidates.len().min(self.max_items));

        for element in candidates.into_iter().take(self.max_items) {
            match self.probes.probe(element, base_url) {
                Ok(fields) => {
                    records.push(ListingRecord::from_fields(fields, source, Utc::now()));
                }
                Err(e) => {
                    tracing::debug!("Skipping listing element: {}", e);
                }
            }
        }

        records
    }

    /// Runs the strategy chain, returning the first non-empty candidate set
    fn select_candidates<'a>(&self, document: &'a Html) -> Option<Vec<ElementRef<'a>>> {
        for strategy in &self.strategies {
            let candidates = strategy.candidates(document);
            if candidates.is_empty() {
                continue;
            }

            if strategy.is_fallback() {
                tracing::warn!(
                    "No listing selector matched, fell back to '{}' ({} elements)",
                    strategy.name(),
                    candidates.len()
                );
            } else {
                tracing::info!(
                    "Found {} items with strategy '{}'",
                    candidates.len(),
                    strategy.name()
                );
            }
            return Some(candidates);
        }

        None
    }
}
