use super::normalize_url;
use url::Url;

/// Resolves an attribute value found on `base_url` to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - values that do not resolve to an HTTP(S) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match normalize_url(absolute.as_str()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Dropping link {}: {}", href, e);
            None
        }
    }
}
