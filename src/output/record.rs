use crate::extract::normalize_amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored in text fields that could not be found on the page
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw text fields pulled out of one listing element
///
/// Every field defaults to [`NOT_AVAILABLE`], so a record is always fully
/// shaped even when the markup carries none of the optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    pub title: String,
    pub url: Option<String>,
    pub sector: String,
    pub location: String,
    pub revenue: String,
    pub price: String,
    pub date: String,
}

impl Default for ListingFields {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            url: None,
            sector: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            revenue: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            date: NOT_AVAILABLE.to_string(),
        }
    }
}

/// One extracted listing
///
/// Serialized field names follow the published JSON layout (`ca` for the
/// revenue text, `*_clean` for the normalized amounts). `url`, `ca_clean` and
/// `price_clean` serialize as `null` when absent; no key is ever omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub url: Option<String>,
    pub sector: String,
    pub location: String,
    #[serde(rename = "ca")]
    pub raw_revenue: String,
    #[serde(rename = "price")]
    pub raw_price: String,
    pub date: String,
    #[serde(rename = "source")]
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(rename = "ca_clean")]
    pub normalized_revenue: Option<i64>,
    #[serde(rename = "price_clean")]
    pub normalized_price: Option<i64>,
}

impl ListingRecord {
    /// Builds a record from raw fields, deriving the normalized amounts
    pub fn from_fields(fields: ListingFields, source_url: &str, scraped_at: DateTime<Utc>) -> Self {
        let normalized_revenue = normalize_amount(&fields.revenue);
        let normalized_price = normalize_amount(&fields.price);

        Self {
            title: fields.title,
            url: fields.url,
            sector: fields.sector,
            location: fields.location,
            raw_revenue: fields.revenue,
            raw_price: fields.price,
            date: fields.date,
            source_url: source_url.to_string(),
            scraped_at,
            normalized_revenue,
            normalized_price,
        }
    }
}
