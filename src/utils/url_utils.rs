//! URL helpers for resolving extracted references against the page URL.

use url::Url;

/// Resolve a possibly relative reference against `base`.
///
/// Absolute references are returned normalized; relative ones are joined onto
/// the page URL. `data:` URIs and unparseable references yield `None`.
#[must_use]
pub fn resolve_url(base: Option<&Url>, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("data:") || reference.starts_with("javascript:") {
        return None;
    }

    if let Ok(absolute) = Url::parse(reference) {
        return Some(absolute.to_string());
    }

    base.and_then(|b| b.join(reference).ok()).map(|u| u.to_string())
}
