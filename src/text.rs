//! Title cleaning, keyword derivation and local keyword matching.
//!
//! Everything here is pure: no I/O, and no failure on any string input.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::traits::Document;

static PDF_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[?pdf(?:\]|\b)\s*[:\-]?\s*").expect("valid pdf marker pattern")
});

static PDF_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf$").expect("valid extension pattern"));

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-_]+").expect("valid separator pattern"));

static HASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[0-9a-fA-F]{16,}$").expect("valid hash pattern"));

fn clean_once(raw: &str) -> String {
    let title = PDF_MARKER.replace(raw, "");
    let title = match title.find('?') {
        Some(pos) => &title[..pos],
        None => &title[..],
    };
    let title = PDF_EXTENSION.replace(title, "");
    let title = SEPARATOR_RUN.replace_all(&title, " ");
    let title = HASH_SUFFIX.replace(&title, "");
    title.trim().to_string()
}

/// Cleans a raw candidate title (usually a PDF file name or search-engine
/// title) into a presentable, keyword-friendly form.
///
/// Strips a leading `[PDF]` / `pdf:` / `pdf -` marker, anything from the first
/// `?`, a trailing `.pdf`, turns hyphen and underscore runs into single
/// spaces, drops a trailing content hash of 16+ hex digits and trims.
///
/// The result is a fixed point: `normalize_title(&normalize_title(x)) ==
/// normalize_title(x)`.
pub fn normalize_title(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn title_tokens(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| c.is_whitespace() || c == ',' || c == '-')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn query_tokens(query: &str) -> impl Iterator<Item = String> + '_ {
    query.split_whitespace().map(str::to_lowercase)
}

/// Derives the searchable keyword set of a document about to be persisted:
/// the lowercase tokens of its normalized title (split on whitespace, commas
/// and hyphens) together with the lowercase tokens of the query that led to it.
pub fn derive_keywords(normalized_title: &str, query: &str) -> BTreeSet<String> {
    title_tokens(normalized_title)
        .chain(query_tokens(query))
        .collect()
}

fn searchable_tokens(doc: &Document) -> HashSet<String> {
    let mut tokens: HashSet<String> = doc
        .title
        .split(|c: char| c.is_whitespace() || c == ',' || c == '-' || c == '_')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    tokens.extend(doc.keywords.iter().map(|k| k.to_lowercase()));
    tokens
}

/// Whether every whitespace-separated token of `query` appears as a whole
/// token in the document's title or keywords. Case-insensitive. A blank query
/// matches nothing.
pub fn matches(query: &str, doc: &Document) -> bool {
    let wanted: HashSet<String> = query_tokens(query).collect();
    if wanted.is_empty() {
        return false;
    }
    let searchable = searchable_tokens(doc);
    wanted.iter().all(|token| searchable.contains(token))
}

/// Filters `docs` down to the ones matching `query`, keeping their order.
pub fn search_local(query: &str, docs: &[Document]) -> Vec<Document> {
    let results: Vec<Document> = docs.iter().filter(|d| matches(query, d)).cloned().collect();
    debug!(
        "Local search for query '{}' matched {} of {} documents.",
        query,
        results.len(),
        docs.len()
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LOCAL_SOURCE;

    fn doc(title: &str, keywords: &[&str]) -> Document {
        Document {
            id: "TI".to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}.pdf", title.replace(' ', "_")),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            source: LOCAL_SOURCE.to_string(),
        }
    }

    #[test]
    fn test_normalize_strips_pdf_marker_and_extension() {
        assert_eq!(normalize_title("[PDF] Buck-Converter-AN2024.pdf"), "Buck Converter AN2024");
        assert_eq!(normalize_title("pdf: LDO noise"), "LDO noise");
        assert_eq!(normalize_title("PDF - Gate driver basics"), "Gate driver basics");
        assert_eq!(normalize_title("slva477b.PDF"), "slva477b");
    }

    #[test]
    fn test_normalize_keeps_words_starting_with_pdf() {
        assert_eq!(normalize_title("pdfium internals"), "pdfium internals");
        assert_eq!(normalize_title("[pdfium internals"), "[pdfium internals");
    }

    #[test]
    fn test_normalize_strips_unbalanced_pdf_bracket() {
        assert_eq!(normalize_title("[PDF Buck.pdf"), "Buck");
        assert_eq!(normalize_title("PDF] Boost-Converter"), "Boost Converter");
    }

    #[test]
    fn test_normalize_cuts_query_string() {
        assert_eq!(normalize_title("an-1234.pdf?ts=1699999&ref=x"), "an 1234");
    }

    #[test]
    fn test_normalize_collapses_separator_runs() {
        assert_eq!(normalize_title("can__bus--termination"), "can bus termination");
    }

    #[test]
    fn test_normalize_drops_trailing_hash() {
        assert_eq!(
            normalize_title("usb_pd_design_0123456789abcdef0123.pdf"),
            "usb pd design"
        );
        // Too short to be a content hash.
        assert_eq!(normalize_title("rev abc123"), "rev abc123");
        // Not preceded by whitespace.
        assert_eq!(
            normalize_title("x0123456789abcdef0123"),
            "x0123456789abcdef0123"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "[PDF] Buck-Converter-AN2024.pdf",
            "[pdf] [PDF] nested.pdf.pdf",
            "  spaced ___ title 0123456789abcdef0123456789  ",
            "pdf -pdf: twice",
            "a.pdf?b.pdf",
            "",
            "   ",
            "---",
            "Ünïcödé—Titel_mit-Umlauten.PDF",
            "hash then space deadbeefdeadbeefdeadbeef .pdf",
        ];
        for input in inputs {
            let once = normalize_title(input);
            assert_eq!(normalize_title(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_derive_keywords_unions_title_and_query() {
        let kw = derive_keywords("Buck Converter AN2024", "buck converter");
        let expected: BTreeSet<String> = ["buck", "converter", "an2024"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(kw, expected);
    }

    #[test]
    fn test_derive_keywords_splits_commas_and_hyphens() {
        let kw = derive_keywords("I2C, SPI-bus  notes", "Level   Shifter");
        for token in ["i2c", "spi", "bus", "notes", "level", "shifter"] {
            assert!(kw.contains(token), "missing {}", token);
        }
        assert!(!kw.contains(""));
    }

    #[test]
    fn test_derive_keywords_superset_of_title_only() {
        let title_only = derive_keywords("Motor Control", "");
        let with_query = derive_keywords("Motor Control", "bldc motor");
        assert!(with_query.is_superset(&title_only));
        assert!(with_query.contains("bldc"));
    }

    #[test]
    fn test_matches_is_conjunctive() {
        let d = doc("Audio Amplifier Design Guide", &[]);
        assert!(matches("amplifier design", &d));
        assert!(matches("AMPLIFIER", &d));
        assert!(!matches("amplifier layout", &d));
    }

    #[test]
    fn test_matches_whole_tokens_only() {
        let d = doc("Amplifiers", &[]);
        assert!(!matches("amplifier", &d));
        assert!(!matches("amp", &d));
    }

    #[test]
    fn test_matches_uses_keywords_and_underscores() {
        let d = doc("sloa011_op_amp", &["opamp", "filter"]);
        assert!(matches("op amp", &d));
        assert!(matches("filter opamp", &d));
        assert!(matches("sloa011 filter", &d));
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let d = doc("Anything", &["anything"]);
        assert!(!matches("", &d));
        assert!(!matches("   ", &d));
    }

    #[test]
    fn test_search_local_preserves_order() {
        let docs = vec![
            doc("Buck Converter Basics", &[]),
            doc("Boost Converter Basics", &[]),
            doc("Buck Converter Layout", &[]),
        ];
        let results = search_local("buck converter", &docs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Buck Converter Basics");
        assert_eq!(results[1].title, "Buck Converter Layout");
    }
}
