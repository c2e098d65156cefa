//! Pagination state definitions for tracking one listing traversal
//!
//! A traversal moves `Fetching -> Evaluating -> (Fetching | Done)`, with a
//! direct `Fetching -> Done` edge when a page cannot be retrieved.

use crate::output::ListingRecord;
use crate::HarvestError;
use std::fmt;

/// Phase of the per-URL pagination state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationPhase {
    /// Waiting on the fetcher for the current page
    Fetching,

    /// Page retrieved; stop signals are being checked
    Evaluating,

    /// Traversal finished, records are final
    Done,
}

impl PaginationPhase {
    /// Returns true once no further page will be fetched
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the machine may move from `self` to `next`
    pub fn can_transition_to(&self, next: PaginationPhase) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Evaluating)
                | (Self::Fetching, Self::Done)
                | (Self::Evaluating, Self::Fetching)
                | (Self::Evaluating, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Evaluating => "evaluating",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PaginationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The page could not be fetched after all attempts
    FetchFailed,

    /// The extractor found no records on the page
    EmptyPage,

    /// The page has no "next page" link
    NoNextPage,

    /// The "next page" link is present but disabled
    NextPageDisabled,

    /// The page text contains a last-page phrase
    TerminalMarker,

    /// The page ceiling was reached
    PageCeiling,

    /// The run was cancelled from outside
    Cancelled,
}

impl StopReason {
    /// Returns true for reasons that mean the listing may not be complete
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::PageCeiling | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailed => "fetch_failed",
            Self::EmptyPage => "empty_page",
            Self::NoNextPage => "no_next_page",
            Self::NextPageDisabled => "next_page_disabled",
            Self::TerminalMarker => "terminal_marker",
            Self::PageCeiling => "page_ceiling",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable state of one listing traversal
///
/// Owned by the paginator for the lifetime of a single source URL. Records
/// are kept in page-then-document order.
#[derive(Debug)]
pub struct PaginationState {
    page: u32,
    records: Vec<ListingRecord>,
    last_signal: Option<StopReason>,
    phase: PaginationPhase,
}

impl PaginationState {
    /// Starts a traversal at page 1 in the `Fetching` phase
    pub fn new() -> Self {
        Self {
            page: 1,
            records: Vec::new(),
            last_signal: None,
            phase: PaginationPhase::Fetching,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn phase(&self) -> PaginationPhase {
        self.phase
    }

    pub fn last_signal(&self) -> Option<StopReason> {
        self.last_signal
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    /// Moves to `next`, rejecting edges the state machine does not have
    pub fn transition(&mut self, next: PaginationPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Appends the records of the page being evaluated
    pub fn accept_page(&mut self, records: Vec<ListingRecord>) {
        self.records.extend(records);
    }

    /// Ends the traversal with the given reason
    pub fn finish(&mut self, reason: StopReason) -> Result<(), HarvestError> {
        self.transition(PaginationPhase::Done)?;
        self.last_signal = Some(reason);
        Ok(())
    }

    /// Leaves `Evaluating` for the next page
    pub fn advance(&mut self) -> Result<(), HarvestError> {
        self.transition(PaginationPhase::Fetching)?;
        self.page += 1;
        Ok(())
    }

    /// Consumes the state, returning the accumulated records
    pub fn into_records(self) -> Vec<ListingRecord> {
        self.records
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}
