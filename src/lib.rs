//! # notesearch
//!
//! Find technical documents (application notes, design guides) in a small
//! local JSON knowledge base, supplemented by live web search. Opening a web
//! result stores it locally with derived keywords, so the base grows with use.
//!
//! ## Features
//!
//! - Whole-token, conjunctive keyword matching over a JSON knowledge base
//! - Streaming web results from vendor application-note libraries
//! - URL de-duplication between local and web results
//! - Title cleaning and keyword derivation for stored documents
//! - Both library and CLI interfaces
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notesearch::{
//!     DuckDuckGoSearch, JsonDocumentStore, NoteFinder, NoteSearchDirs, SearchEvent,
//!     WebSearchConfig,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let dirs = NoteSearchDirs::new();
//! let store = JsonDocumentStore::new(dirs.default_db_path());
//! let web = DuckDuckGoSearch::new(WebSearchConfig::default());
//!
//! let mut finder = NoteFinder::new(Box::new(store), Arc::new(web))?;
//!
//! let mut opened = None;
//! for event in finder.run_query("buck converter")? {
//!     if let SearchEvent::Hit(doc) = event {
//!         println!("[{}] {} - {}", doc.source, doc.title, doc.url);
//!         opened.get_or_insert(doc);
//!     }
//! }
//!
//! // Web results are added to the knowledge base when opened
//! if let Some(doc) = opened {
//!     finder.open(&doc)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub use traits::{Document, DocumentStore, Origin, WebResults, WebSearch};

pub mod config;
pub use config::{DelayRange, NoteSearchDirs, WebSearchConfig};

pub mod error;
pub use error::{SearchError, StoreError};

pub mod text;
pub use text::{derive_keywords, matches, normalize_title, search_local};

pub mod engines;
pub use engines::JsonDocumentStore;

pub mod web;
pub use web::{DuckDuckGoSearch, OfflineSearch};

pub mod search;
pub use search::{NoteFinder, OpenOutcome, ResultStream, SearchEvent, SearchPhase};
