use crate::{UrlError, UrlResult};
use ::url::Url;

/// Resolves a listing link's href against the listing's base URL
///
/// Returns `Ok(None)` for hrefs that never point at a listing page:
/// - empty hrefs and same-page fragments
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - anything that resolves to a non-HTTP(S) URL
///
/// # Errors
///
/// Returns `UrlError::Parse` when the href cannot be joined onto the base
/// at all (for example a malformed host). Callers treat that as a broken
/// element rather than a missing link.
pub fn resolve_href(href: &str, base_url: &Url) -> UrlResult<Option<Url>> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Ok(None);
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return Ok(None);
    }

    let absolute = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Ok(Some(absolute))
    } else {
        Ok(None)
    }
}
