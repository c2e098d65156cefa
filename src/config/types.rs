use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Listing-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

/// HTTP session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept header
    pub accept: String,

    /// Accept-Language header
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Connect and read timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Keep a session cookie store between requests
    pub cookies: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "fr-FR,fr;q=0.9,en;q=0.8".to_string(),
            timeout_secs: 15,
            cookies: true,
        }
    }
}

/// Retry and politeness settings for single page fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total attempts per page, first one included
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay after a successful first attempt (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Extra delay per attempt index (milliseconds)
    #[serde(rename = "politeness-step-ms")]
    pub politeness_step_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            politeness_delay_ms: 1000,
            politeness_step_ms: 500,
        }
    }
}

/// Pagination stopping policy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Hard ceiling on pages visited per source URL
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Delay between two pages of the same source URL (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Phrases that mark the last page (case-insensitive)
    #[serde(rename = "terminal-markers")]
    pub terminal_markers: Vec<String>,
}

impl PaginationConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            page_delay_ms: 2000,
            terminal_markers: vec!["dernière".to_string(), "last".to_string()],
        }
    }
}

/// Record extraction settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum candidates processed per page
    #[serde(rename = "max-items-per-page")]
    pub max_items_per_page: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_items_per_page: 50,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON result file
    #[serde(rename = "json-path")]
    pub json_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "listings.json".to_string(),
        }
    }
}

/// One category and the listing URLs that feed it
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Category name, used as the key in the result envelope
    pub name: String,

    /// Seed listing URLs, paginated in order
    pub urls: Vec<String>,
}
