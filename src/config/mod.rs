//! Configuration module for Listing-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Paginating at most {} pages per URL", config.pagination.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryEntry, Config, ExtractionConfig, FetchConfig, HttpConfig, OutputConfig,
    PaginationConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
