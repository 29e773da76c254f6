use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Source label for documents seeded into the local knowledge base.
pub const LOCAL_SOURCE: &str = "Local DB";
/// Source label for web results whose backend gave no domain.
pub const WEB_SOURCE: &str = "Web";
/// Source label carried by error sentinels.
pub const ERROR_SOURCE: &str = "Error";
/// Id carried by error sentinels.
pub const ERROR_ID: &str = "ERROR";

/// A document record, both the unit of storage and of a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Vendor or source tag ("TI", "ADI", ...), informational only.
    pub id: String,
    pub title: String,
    /// Unique key within the store.
    pub url: String,
    /// Lowercase tokens used for local matching.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Provenance label, e.g. "Local DB" or "Web (ti.com)".
    pub source: String,
}

/// Where a document came from, derived from its `source` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Web,
    Error,
}

impl Document {
    /// Builds a transient web result (no keywords until it is persisted).
    pub fn web(id: &str, title: &str, url: &str, domain: &str) -> Self {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            keywords: Vec::new(),
            source: format!("Web ({})", domain),
        }
    }

    /// Builds the record a web backend yields instead of failing.
    pub fn error_sentinel(message: impl Into<String>) -> Self {
        Document {
            id: ERROR_ID.to_string(),
            title: message.into(),
            url: String::new(),
            keywords: Vec::new(),
            source: ERROR_SOURCE.to_string(),
        }
    }

    pub fn origin(&self) -> Origin {
        if self.source == ERROR_SOURCE && self.id == ERROR_ID {
            Origin::Error
        } else if self.source.contains("Local") {
            Origin::Local
        } else if self.source.contains("Web") {
            Origin::Web
        } else {
            Origin::Local
        }
    }

    pub fn is_error(&self) -> bool {
        self.origin() == Origin::Error
    }
}

/// Lazily produced sequence of candidate records from a web backend.
pub type WebResults = Box<dyn Iterator<Item = Document> + Send>;

/// Durable, URL-keyed collection of documents.
pub trait DocumentStore {
    /// Returns every stored document in insertion order.
    fn load(&self) -> Result<Vec<Document>, StoreError>;
    /// Replaces the stored documents with `records`.
    fn save(&self, records: &[Document]) -> Result<(), StoreError>;
    /// Persists `doc` unless its URL is already stored. Returns whether it was added.
    fn append_if_absent(&self, doc: &Document, query: &str) -> Result<bool, StoreError>;
    fn len(&self) -> Result<usize, StoreError>;
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Capability of producing web candidates for a query.
///
/// Implementations may block on network calls between items and must yield
/// an error sentinel (see [`Document::error_sentinel`]) rather than panic or
/// fail when the backend is unreachable or misconfigured. The returned
/// sequence ends after `max_results` candidates at the latest.
pub trait WebSearch: Send + Sync {
    fn search(&self, query: &str, max_results: usize) -> WebResults;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_classification() {
        let local = Document {
            id: "TI".to_string(),
            title: "Buck Converter".to_string(),
            url: "a.com/x.pdf".to_string(),
            keywords: vec![],
            source: LOCAL_SOURCE.to_string(),
        };
        assert_eq!(local.origin(), Origin::Local);

        let web = Document::web("TI", "Buck", "https://ti.com/lit/an/x.pdf", "ti.com");
        assert_eq!(web.origin(), Origin::Web);
        assert_eq!(web.source, "Web (ti.com)");

        let err = Document::error_sentinel("backend unreachable");
        assert_eq!(err.origin(), Origin::Error);
        assert!(err.is_error());
        assert!(err.url.is_empty());
    }

    #[test]
    fn test_unknown_source_is_treated_as_local() {
        let doc = Document {
            id: "x".to_string(),
            title: "t".to_string(),
            url: "u".to_string(),
            keywords: vec![],
            source: "Manual".to_string(),
        };
        assert_eq!(doc.origin(), Origin::Local);
    }

    #[test]
    fn test_keywords_default_when_missing() {
        let json = r#"{"id":"TI","title":"LDO Basics","url":"u","source":"Local DB"}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.keywords.is_empty());
    }
}
