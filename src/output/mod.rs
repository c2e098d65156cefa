//! Output module for harvest results
//!
//! This module handles:
//! - The listing record and its published JSON layout
//! - The per-category result envelope and its JSON writer
//! - Run statistics for reporting partial failures

mod envelope;
mod record;
pub mod stats;

pub use envelope::{write_envelope, ResultEnvelope};
pub use record::{ListingFields, ListingRecord, NOT_AVAILABLE};
pub use stats::{print_statistics, RunStatistics, UrlReport};
