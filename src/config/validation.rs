use crate::config::types::{
    CategoryEntry, Config, ExtractionConfig, FetchConfig, HttpConfig, PaginationConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_fetch_config(&config.fetch)?;
    validate_pagination_config(&config.pagination)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.terminal_markers.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "terminal-markers cannot contain empty phrases".to_string(),
        ));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.max_items_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max-items-per-page must be >= 1, got {}",
            config.max_items_per_page
        )));
    }

    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the category table
///
/// Names must be non-empty and unique (they become JSON keys), and every
/// seed URL must be an absolute HTTP(S) URL.
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[category]] is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in categories {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name '{}'",
                entry.name
            )));
        }

        for seed in &entry.urls {
            validate_seed_url(seed)?;
        }
    }

    Ok(())
}

fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}': scheme must be http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("'{}': missing host", seed)));
    }

    Ok(())
}
