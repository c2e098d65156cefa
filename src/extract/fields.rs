//! Field probes applied to a single listing element

use crate::output::{ListingFields, NOT_AVAILABLE};
use crate::url::resolve_href;
use crate::ExtractError;
use scraper::{ElementRef, Selector};
use url::Url;

const TITLE_SELECTOR: &str = r#"a, h3, .title, [class*="titre"], h4, h5"#;
const SECTOR_SELECTOR: &str = r#"[class*="secteur"], .category, .secteur"#;
const LOCATION_SELECTOR: &str =
    r#"[class*="localisation"], .location, .ville, .region, [class*="lieu"]"#;
const REVENUE_SELECTOR: &str =
    r#"[class*="ca"], [class*="chiffre"], .amount, .ca, [class*="CA"]"#;
const PRICE_SELECTOR: &str = r#"[class*="prix"], .price, .montant"#;
const DATE_SELECTOR: &str = r#".date, [class*="date"], time"#;

/// Compiled selectors for every probed field
///
/// Class-name substring matches (`[class*="..."]`) are case-sensitive, so
/// `ca` and `CA` are listed separately for revenue.
#[derive(Debug, Clone)]
pub struct FieldProbes {
    title: Selector,
    sector: Selector,
    location: Selector,
    revenue: Selector,
    price: Selector,
    date: Selector,
}

impl FieldProbes {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            title: compile(TITLE_SELECTOR)?,
            sector: compile(SECTOR_SELECTOR)?,
            location: compile(LOCATION_SELECTOR)?,
            revenue: compile(REVENUE_SELECTOR)?,
            price: compile(PRICE_SELECTOR)?,
            date: compile(DATE_SELECTOR)?,
        })
    }

    /// Extracts every field from one candidate element
    ///
    /// Missing fields become `"N/A"`. The only failure is a link that cannot
    /// be resolved against `base_url`, which marks the element as broken.
    pub fn probe(&self, element: ElementRef<'_>, base_url: &Url) -> Result<ListingFields, ExtractError> {
        let title_node = element
            .select(&self.title)
            .next()
            .or_else(|| (element.value().name() == "a").then_some(element));

        let title = title_node
            .map(element_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let url = match title_node.and_then(|node| node.value().attr("href")) {
            Some(href) => resolve_href(href, base_url)
                .map_err(|e| ExtractError::ElementParseFailure {
                    reason: e.to_string(),
                })?
                .map(String::from),
            None => None,
        };

        Ok(ListingFields {
            title,
            url,
            sector: self.first_text(element, &self.sector),
            location: self.first_text(element, &self.location),
            revenue: self.first_text(element, &self.revenue),
            price: self.first_text(element, &self.price),
            date: self.first_text(element, &self.date),
        })
    }

    fn first_text(&self, element: ElementRef<'_>, selector: &Selector) -> String {
        element
            .select(selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Text content with each text node trimmed, concatenated without separator
///
/// Inline markup therefore glues words together: `Cession <b>PME</b>` reads
/// as `CessionPME`.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base_url() -> Url {
        Url::parse("https://www.fusacq.com/reprendre-une-entreprise/resultats?tri=").unwrap()
    }

    fn first_div(html: &Html) -> ElementRef<'_> {
        let selector = Selector::parse("div.card").unwrap();
        html.select(&selector).next().unwrap()
    }

    #[test]
    fn test_probe_full_card() {
        let html = Html::parse_document(
            r#"<div class="card">
                <a class="titre" href="/annonce/77">Cession PME industrielle</a>
                <span class="secteur">Industrie</span>
                <span class="ville">Lyon (69)</span>
                <span class="chiffre-affaires">CA : 2,5 M€</span>
                <span class="prix">1 M€</span>
                <span class="date">12/03/2021</span>
            </div>"#,
        );
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields.title, "Cession PME industrielle");
        assert_eq!(
            fields.url.as_deref(),
            Some("https://www.fusacq.com/annonce/77")
        );
        assert_eq!(fields.sector, "Industrie");
        assert_eq!(fields.location, "Lyon (69)");
        assert_eq!(fields.revenue, "CA : 2,5 M€");
        assert_eq!(fields.price, "1 M€");
        assert_eq!(fields.date, "12/03/2021");
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        // "localisation" contains "ca", so it also satisfies the revenue probe
        let html = Html::parse_document(
            r#"<div class="card">
                <span class="localisation">Nantes</span>
                <span class="chiffre">4 M€</span>
            </div>"#,
        );
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields.location, "Nantes");
        assert_eq!(fields.revenue, "Nantes");
    }

    #[test]
    fn test_probe_missing_fields_are_sentinels() {
        let html = Html::parse_document(r#"<div class="card"><p>Rien ici</p></div>"#);
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields, ListingFields::default());
    }

    #[test]
    fn test_probe_anchor_candidate_uses_itself_as_title() {
        let html = Html::parse_document(r#"<div><a href="fiche-9" title="x">Fonds de commerce</a></div>"#);
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();

        let fields = FieldProbes::new().unwrap().probe(anchor, &base_url()).unwrap();

        assert_eq!(fields.title, "Fonds de commerce");
        assert_eq!(
            fields.url.as_deref(),
            Some("https://www.fusacq.com/reprendre-une-entreprise/fiche-9")
        );
    }

    #[test]
    fn test_probe_title_without_href_has_no_url() {
        let html = Html::parse_document(r#"<div class="card"><h4>Hôtel restaurant</h4></div>"#);
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields.title, "Hôtel restaurant");
        assert_eq!(fields.url, None);
    }

    #[test]
    fn test_probe_broken_href_fails() {
        let html = Html::parse_document(r#"<div class="card"><a href="http://[::1">Broken</a></div>"#);
        let result = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url());

        assert!(matches!(
            result,
            Err(ExtractError::ElementParseFailure { .. })
        ));
    }

    #[test]
    fn test_revenue_class_match_is_case_sensitive() {
        let html = Html::parse_document(
            r#"<div class="card"><span class="montantCA">3 M€</span></div>"#,
        );
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields.revenue, "3 M€");
        assert_eq!(fields.price, NOT_AVAILABLE);
    }

    #[test]
    fn test_element_text_concatenates_trimmed_nodes() {
        let html = Html::parse_document(
            r#"<div class="card">  350 000 <small> € </small>
            </div>"#,
        );
        assert_eq!(element_text(first_div(&html)), "350 000€");
    }

    #[test]
    fn test_inline_markup_is_glued() {
        let html = Html::parse_document(
            r#"<div class="card">
                <a href="/annonce/5">Cession <b>PME</b></a>
                <span class="prix">350 000<small>€</small></span>
            </div>"#,
        );
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields.title, "CessionPME");
        assert_eq!(fields.price, "350 000€");
    }

    #[test]
    fn test_blank_field_becomes_sentinel() {
        let html = Html::parse_document(
            r#"<div class="card"><a href="/annonce/6">Garage</a><span class="prix">   </span></div>"#,
        );
        let fields = FieldProbes::new()
            .unwrap()
            .probe(first_div(&html), &base_url())
            .unwrap();

        assert_eq!(fields.price, NOT_AVAILABLE);
    }
}
