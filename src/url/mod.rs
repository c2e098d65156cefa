//! URL handling module for Listing-Harvest
//!
//! This module provides seed URL validation, page URL construction for
//! pagination and resolution of listing links against a base URL.

mod page;
mod resolve;

// Re-export main functions
pub use page::{build_page_url, parse_absolute};
pub use resolve::resolve_href;
