//! Web result generators.

pub mod duckduckgo;
pub use duckduckgo::DuckDuckGoSearch;

use crate::traits::{WebResults, WebSearch};

/// Backend that never goes online; every query yields nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSearch;

impl WebSearch for OfflineSearch {
    fn search(&self, _query: &str, _max_results: usize) -> WebResults {
        Box::new(std::iter::empty())
    }
}

/// Maps a result URL to the short vendor tag shown next to it.
pub fn vendor_for(url: &str) -> &'static str {
    const VENDORS: &[(&str, &str)] = &[
        ("ti.com", "TI"),
        ("analog.com", "ADI"),
        ("st.com", "ST"),
        ("infineon.com", "INF"),
        ("nxp.com", "NXP"),
        ("microchip.com", "Microchip"),
        ("renesas.com", "Renesas"),
        ("onsemi.com", "Onsemi"),
        ("maximintegrated.com", "Maxim"),
        ("vishay.com", "Vishay"),
        ("rohm.com", "ROHM"),
    ];
    VENDORS
        .iter()
        .find(|(domain, _)| url.contains(domain))
        .map(|(_, vendor)| *vendor)
        .unwrap_or("Unknown")
}

/// Domain part of a `site:` filter, e.g. `ti.com` for `site:ti.com/lit/an`.
pub fn target_domain(site_filter: &str) -> &str {
    let site = site_filter.trim();
    let site = site.strip_prefix("site:").unwrap_or(site);
    site.split('/').next().unwrap_or(site)
}

/// Title derived from the last URL path segment, used when a result has no
/// title of its own.
pub fn title_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path);
    segment.replace(".pdf", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_for_known_hosts() {
        assert_eq!(vendor_for("https://www.ti.com/lit/an/slva477b/slva477b.pdf"), "TI");
        assert_eq!(vendor_for("https://www.analog.com/media/en/an-1368.pdf"), "ADI");
        assert_eq!(vendor_for("https://www.st.com/resource/en/application_note/an4013.pdf"), "ST");
        assert_eq!(
            vendor_for("https://ww1.microchip.com/downloads/en/AppNotes/00001.pdf"),
            "Microchip"
        );
        assert_eq!(vendor_for("https://example.org/whatever.pdf"), "Unknown");
    }

    #[test]
    fn test_target_domain() {
        assert_eq!(target_domain("site:ti.com/lit/an"), "ti.com");
        assert_eq!(
            target_domain("site:ww1.microchip.com/downloads/en/AppNotes/"),
            "ww1.microchip.com"
        );
        assert_eq!(target_domain("site:vishay.com"), "vishay.com");
    }

    #[test]
    fn test_title_from_url() {
        assert_eq!(title_from_url("https://www.ti.com/lit/an/slva477b/slva477b.pdf"), "slva477b");
        assert_eq!(title_from_url("https://a.com/docs/an-42.pdf?ts=1"), "an-42");
        assert_eq!(title_from_url("https://a.com/docs/page/"), "page");
    }

    #[test]
    fn test_offline_search_yields_nothing() {
        assert_eq!(OfflineSearch.search("buck", 20).count(), 0);
    }
}
