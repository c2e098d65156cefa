//! Candidate selection strategies
//!
//! Listing pages on the target site have changed markup many times. Each
//! strategy recognises one generation of that markup; the extractor asks them
//! in order and keeps the first non-empty answer.

use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// Something that can pick listing elements out of a document
pub trait CandidateSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Returns matching elements in document order
    fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;

    /// Returns true for the catch-all strategy at the end of the chain
    fn is_fallback(&self) -> bool {
        false
    }
}

/// A strategy backed by a CSS selector group
#[derive(Debug, Clone)]
pub struct SelectorGroup {
    name: String,
    css: String,
    selector: Selector,
    fallback: bool,
}

impl SelectorGroup {
    /// Compiles a selector group
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidSelector` if `css` does not parse.
    pub fn new(name: &str, css: &str) -> Result<Self, ExtractError> {
        let selector = Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
            selector: css.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            css: css.to_string(),
            selector,
            fallback: false,
        })
    }

    /// Marks this group as the catch-all of the chain
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub fn css(&self) -> &str {
        &self.css
    }
}

impl CandidateSource for SelectorGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }

    fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Listing selector groups, most specific first
const LISTING_GROUPS: &[(&str, &str)] = &[
    ("listing-items", ".annonce-item, .item-annonce, .listing-item"),
    ("result-blocks", ".result-item, .search-result, .bloc-annonce"),
    (
        "annonce-containers",
        r#"div[class*="annonce"], div[class*="item"] a[href]"#,
    ),
    ("result-rows", "tr.result-row, .table-result tr"),
    ("company-sheets", ".fiches, .fiche-entreprise"),
    ("result-lists", ".resultat, .resultats li"),
];

/// Catch-all used when no listing group matches
const FALLBACK_GROUP: (&str, &str) = ("any-link", "a[href][title], div a[href]");

/// Builds the default strategy chain for the target site
pub fn default_strategies() -> Result<Vec<Box<dyn CandidateSource>>, ExtractError> {
    let mut strategies: Vec<Box<dyn CandidateSource>> = Vec::with_capacity(LISTING_GROUPS.len() + 1);

    for (name, css) in LISTING_GROUPS {
        strategies.push(Box::new(SelectorGroup::new(name, css)?));
    }

    let (name, css) = FALLBACK_GROUP;
    strategies.push(Box::new(SelectorGroup::new(name, css)?.as_fallback()));

    Ok(strategies)
}
