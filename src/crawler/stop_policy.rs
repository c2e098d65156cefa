//! Stopping policy for listing pagination
//!
//! The target site never says how many pages a result set has, and none of
//! its end-of-list indicators is reliable on its own. The policy combines
//! four signals, checked in this order:
//!
//! 1. The page produced no records
//! 2. There is no "next page" link, or it is disabled
//! 3. The page text contains a last-page phrase
//! 4. The page ceiling has been reached

use crate::config::PaginationConfig;
use crate::state::StopReason;
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

const NEXT_PAGE_SELECTOR: &str = r#"a.next, .pagination-next, [rel="next"], .suivant"#;

/// Decides whether a traversal ends after the current page
#[derive(Debug, Clone)]
pub struct StopPolicy {
    max_pages: u32,
    markers: Vec<String>,
    next_page: Selector,
}

impl StopPolicy {
    /// Creates a policy with an explicit ceiling and marker list
    pub fn new(max_pages: u32, markers: &[String]) -> Result<Self, ExtractError> {
        let next_page =
            Selector::parse(NEXT_PAGE_SELECTOR).map_err(|e| ExtractError::InvalidSelector {
                selector: NEXT_PAGE_SELECTOR.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            max_pages: max_pages.max(1),
            markers: markers.iter().map(|m| m.to_lowercase()).collect(),
            next_page,
        })
    }

    pub fn from_config(config: &PaginationConfig) -> Result<Self, ExtractError> {
        Self::new(config.max_pages, &config.terminal_markers)
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Evaluates the stop signals for page `page` (1-based)
    ///
    /// Returns the first signal that fires, or `None` to continue with the
    /// next page.
    pub fn evaluate(&self, page: u32, record_count: usize, document: &Html) -> Option<StopReason> {
        if record_count == 0 {
            return Some(StopReason::EmptyPage);
        }

        if let Some(reason) = self.next_page_signal(document) {
            return Some(reason);
        }

        if self.has_terminal_marker(document) {
            return Some(StopReason::TerminalMarker);
        }

        if page >= self.max_pages {
            return Some(StopReason::PageCeiling);
        }

        None
    }

    fn next_page_signal(&self, document: &Html) -> Option<StopReason> {
        match document.select(&self.next_page).next() {
            None => Some(StopReason::NoNextPage),
            Some(link) if is_disabled(link) => Some(StopReason::NextPageDisabled),
            Some(_) => None,
        }
    }

    /// Scans the visible text of the page for a last-page phrase
    ///
    /// This is a broad check: a phrase such as "last" can appear anywhere on
    /// the page, so it may end a traversal early. Script and style contents
    /// are left out to limit that.
    fn has_terminal_marker(&self, document: &Html) -> bool {
        if self.markers.is_empty() {
            return false;
        }

        let text = visible_text(document).to_lowercase();
        self.markers.iter().any(|marker| text.contains(marker.as_str()))
    }
}

fn is_disabled(link: ElementRef<'_>) -> bool {
    let element = link.value();
    element.classes().any(|class| class.contains("disabled"))
        || element.attr("disabled").is_some()
        || element
            .attr("aria-disabled")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Concatenated text nodes of the document, outside `<script>` and `<style>`
fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|parent| matches!(parent.name(), "script" | "style"));
        if hidden {
            continue;
        }

        text.push_str(fragment);
        text.push(' ');
    }

    text
}
