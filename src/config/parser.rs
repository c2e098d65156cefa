use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use listing_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Categories: {}", config.categories.len());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is logged at startup so that result files can be traced back to
/// the exact category table that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[http]
user-agent = "TestAgent/1.0"
accept-language = "en-US"
timeout-secs = 5
cookies = false

[fetch]
max-attempts = 4
politeness-delay-ms = 10
politeness-step-ms = 5

[pagination]
max-pages = 7
page-delay-ms = 0
terminal-markers = ["fin"]

[extraction]
max-items-per-page = 20

[output]
json-path = "./out.json"

[[category]]
name = "repreneurs"
urls = ["https://example.com/annuaire"]

[[category]]
name = "fonds"
urls = ["https://example.com/fonds?x=1", "https://example.com/fonds?x=2"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.http.user_agent, "TestAgent/1.0");
        assert!(!config.http.cookies);
        assert_eq!(config.fetch.max_attempts, 4);
        assert_eq!(config.pagination.max_pages, 7);
        assert_eq!(config.pagination.terminal_markers, vec!["fin".to_string()]);
        assert_eq!(config.extraction.max_items_per_page, 20);
        assert_eq!(config.output.json_path, "./out.json");
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "repreneurs");
        assert_eq!(config.categories[1].urls.len(), 2);
    }

    #[test]
    fn test_defaults_apply_to_missing_sections() {
        let config_content = r#"
[[category]]
name = "valuations"
urls = ["https://example.com/base-valorisations"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.politeness_delay_ms, 1000);
        assert_eq!(config.fetch.politeness_step_ms, 500);
        assert_eq!(config.pagination.max_pages, 50);
        assert_eq!(config.pagination.page_delay_ms, 2000);
        assert_eq!(config.extraction.max_items_per_page, 50);
        assert_eq!(config.http.timeout_secs, 15);
        assert_eq!(config.http.accept_language, "fr-FR,fr;q=0.9,en;q=0.8");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[fetch]
max-attempts = 0

[[category]]
name = "repreneurs"
urls = ["https://example.com/annuaire"]
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_sample_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("harvest.example.toml");
        let config = load_config(&path).unwrap();

        assert_eq!(config.categories.len(), 6);
        assert_eq!(config.categories[0].name, "repreneurs");
        assert_eq!(config.output.json_path, "fusacq_listings.json");
    }
}
