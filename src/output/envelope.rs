use crate::output::ListingRecord;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Top-level result of a harvest run
///
/// Categories keep the order in which they were first added, which is the
/// order of the category table. `total_items` always equals the sum of all
/// bucket lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    scraped_at: DateTime<Utc>,
    total_items: usize,
    sources: Vec<(String, Vec<ListingRecord>)>,
}

impl ResultEnvelope {
    /// Creates an empty envelope stamped with the given run start time
    pub fn new(scraped_at: DateTime<Utc>) -> Self {
        Self {
            scraped_at,
            total_items: 0,
            sources: Vec::new(),
        }
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Makes sure a bucket exists for `category`, creating an empty one if needed
    pub fn ensure_category(&mut self, category: &str) {
        self.bucket_mut(category);
    }

    /// Appends records to a category bucket and updates the running total
    pub fn extend_category(&mut self, category: &str, records: Vec<ListingRecord>) {
        self.total_items += records.len();
        self.bucket_mut(category).extend(records);
    }

    /// Returns the records of one category, if the category exists
    pub fn category(&self, category: &str) -> Option<&[ListingRecord]> {
        self.sources
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, records)| records.as_slice())
    }

    /// Iterates over `(category, records)` in insertion order
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[ListingRecord])> {
        self.sources
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    fn bucket_mut(&mut self, category: &str) -> &mut Vec<ListingRecord> {
        let index = match self.sources.iter().position(|(name, _)| name == category) {
            Some(index) => index,
            None => {
                self.sources.push((category.to_string(), Vec::new()));
                self.sources.len() - 1
            }
        };
        &mut self.sources[index].1
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultEnvelope", 3)?;
        state.serialize_field("scraped_at", &self.scraped_at)?;
        state.serialize_field("total_items", &self.total_items)?;
        state.serialize_field("sources", &Sources(&self.sources))?;
        state.end()
    }
}

/// Serializes the ordered bucket list as a JSON object
struct Sources<'a>(&'a [(String, Vec<ListingRecord>)]);

impl Serialize for Sources<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, records) in self.0 {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}

/// Writes the envelope as pretty-printed UTF-8 JSON
///
/// Parent directories are created when missing.
pub fn write_envelope(envelope: &ResultEnvelope, path: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "Wrote {} items to {}",
        envelope.total_items(),
        path.display()
    );
    Ok(())
}
