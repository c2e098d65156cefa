//! State module for tracking pagination progress
//!
//! # Components
//!
//! - `PaginationPhase`: phase of the per-URL traversal state machine
//! - `StopReason`: which stop signal ended a traversal
//! - `PaginationState`: page counter and accumulated records of one traversal

mod pagination_state;

// Re-export main types
pub use pagination_state::{PaginationPhase, PaginationState, StopReason};
