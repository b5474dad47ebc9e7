//! Active navigation link highlighting.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::dom::Document;
use crate::error::DomError;

pub const ACTIVE_CLASS: &str = "active";

/// Page name addressed by a path or href: the last segment without `.html`.
///
/// Query and fragment are ignored and a trailing `/` means `index`. Returns
/// `None` for an empty or fragment-only reference.
#[must_use]
pub fn page_name(reference: &str) -> Option<String> {
    let path = reference.split(&['?', '#'][..]).next().unwrap_or_default().trim();
    if path.is_empty() {
        return None;
    }
    let segment = path.rsplit('/').next().unwrap_or_default();
    let segment = if segment.is_empty() { "index.html" } else { segment };
    Some(segment.strip_suffix(".html").unwrap_or(segment).to_owned())
}

/// Whether `href` points into this site: no scheme and not protocol-relative.
fn is_site_local(href: &str) -> bool {
    let href = href.trim();
    if href.starts_with("//") {
        return false;
    }
    let head = href.split(&['/', '?', '#'][..]).next().unwrap_or_default();
    !head.contains(':')
}

/// Mark the navigation link for the current page and unmark all others.
///
/// Links to other sites (`https://...`, `//host/...`, `mailto:`) are never
/// active. Returns the active page name, or `None` if the current page is not
/// one of `known_pages`.
///
/// # Errors
///
/// Propagates document failures.
pub fn update_active_nav<D: Document>(dom: &mut D, known_pages: &[String]) -> Result<Option<String>, DomError> {
    let current = page_name(&dom.location_path()).filter(|name| known_pages.contains(name));

    for link in dom.navigation_links() {
        let target = dom
            .attribute(&link, "href")
            .filter(|href| is_site_local(href))
            .and_then(|href| page_name(&href));
        let active = current.is_some() && target == current;
        dom.toggle_class(&link, ACTIVE_CLASS, active)?;
        if active {
            dom.set_attribute(&link, "aria-current", "page")?;
        } else {
            dom.remove_attribute(&link, "aria-current")?;
        }
    }
    Ok(current)
}
