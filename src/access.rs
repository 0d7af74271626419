/// Tab accessibility check for Sheet Capture
use crate::tab_data::TabInfo;
use url::Url;

/// URL schemes that belong to the browser or to extensions. Chrome refuses
/// script injection into all of them.
const INTERNAL_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "chrome-untrusted",
    "chrome-search",
    "devtools",
    "edge",
    "about",
    "view-source",
];

/// Decide whether page scripts may run in a tab
///
/// Rules:
/// 1. The tab must carry an id
/// 2. The URL must be non-empty and parse
/// 3. The scheme must not be one of the internal browser schemes
///
/// Examples:
/// - https://example.com → true
/// - chrome://settings → false
/// - chrome-extension://abc/options.html → false
pub fn is_tab_accessible(tab: &TabInfo) -> bool {
    if tab.id.is_none() {
        return false;
    }

    match tab.url.as_deref() {
        Some(url) => is_scriptable_url(url),
        None => false,
    }
}

/// Check a URL on its own, without the tab id requirement
pub fn is_scriptable_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => !INTERNAL_SCHEMES.contains(&parsed.scheme()),
        Err(e) => {
            log::debug!("Unparseable tab URL {:?}: {}", url, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: Option<i32>, url: Option<&str>) -> TabInfo {
        TabInfo {
            id,
            url: url.map(|u| u.to_string()),
            title: None,
        }
    }

    #[test]
    fn test_external_urls_are_accessible() {
        assert!(is_tab_accessible(&tab(Some(1), Some("https://example.com"))));
        assert!(is_tab_accessible(&tab(Some(1), Some("http://localhost:3000/page"))));
        assert!(is_tab_accessible(&tab(Some(1), Some("https://news.bbc.co.uk/article?id=1"))));
        assert!(is_tab_accessible(&tab(Some(1), Some("file:///home/user/notes.html"))));
    }

    #[test]
    fn test_internal_urls_are_not_accessible() {
        assert!(!is_tab_accessible(&tab(Some(1), Some("chrome://settings"))));
        assert!(!is_tab_accessible(&tab(Some(1), Some("chrome://extensions/"))));
        assert!(!is_tab_accessible(&tab(Some(1), Some("chrome-extension://abcdef/options.html"))));
        assert!(!is_tab_accessible(&tab(Some(1), Some("edge://newtab"))));
        assert!(!is_tab_accessible(&tab(Some(1), Some("about:blank"))));
    }

    #[test]
    fn test_missing_id_is_not_accessible() {
        assert!(!is_tab_accessible(&tab(None, Some("https://example.com"))));
    }

    #[test]
    fn test_missing_or_empty_url_is_not_accessible() {
        assert!(!is_tab_accessible(&tab(Some(1), None)));
        assert!(!is_tab_accessible(&tab(Some(1), Some(""))));
        assert!(!is_tab_accessible(&tab(Some(1), Some("   "))));
    }

    #[test]
    fn test_unparseable_url_is_not_accessible() {
        assert!(!is_tab_accessible(&tab(Some(1), Some("not a url"))));
    }
}
