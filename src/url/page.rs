use crate::{UrlError, UrlResult};
use ::url::Url;

/// Parses a string into an absolute HTTP(S) URL
///
/// # Errors
///
/// * `UrlError::Parse` - The string is not a URL at all
/// * `UrlError::NotAbsolute` - The string is a relative reference
/// * `UrlError::InvalidScheme` - The URL is not http or https
pub fn parse_absolute(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| match e {
        ::url::ParseError::RelativeUrlWithoutBase => UrlError::NotAbsolute(raw.to_string()),
        other => UrlError::Parse(format!("{}: {}", raw, other)),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Builds the URL of a given page of a listing
///
/// The page number is appended as a `page=N` query parameter, joined with `&`
/// when the seed already carries a query string and with `?` otherwise. The
/// seed's own parameters are kept verbatim, empty values included, because the
/// target site treats `param=` and a missing `param` differently.
///
/// # Example
///
/// ```
/// use listing_harvest::url::build_page_url;
///
/// let url = build_page_url("https://example.com/annonces?secteur=", 2).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/annonces?secteur=&page=2");
/// ```
pub fn build_page_url(seed: &str, page: u32) -> UrlResult<Url> {
    let seed = seed.trim();
    let raw = if seed.contains('?') {
        format!("{}&page={}", seed, page)
    } else {
        format!("{}?page={}", seed, page)
    };

    parse_absolute(&raw)
}
