//! Local-then-web search sessions and the persistence side of opening a result.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use log::{debug, info};

use crate::error::{SearchError, StoreError};
use crate::text::search_local;
use crate::traits::{Document, DocumentStore, Origin, WEB_SOURCE, WebResults, WebSearch};

/// Default cap on web candidates per query.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Where a search session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Local,
    Web,
    Done,
}

/// One item of the incremental result stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The session moved to a new phase.
    Phase(SearchPhase),
    /// A result to display. Error sentinels from the web backend arrive here
    /// too; check [`Document::is_error`].
    Hit(Document),
    /// The session finished after emitting `total` documents.
    Done { total: usize },
}

/// What [`NoteFinder::open`] did with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A web result was added to the knowledge base.
    Persisted,
    /// A web result whose URL was already stored.
    AlreadyStored,
    /// A local document; nothing to persist.
    Local,
    /// No URL or an error sentinel.
    Ignored,
}

/// Incremental results of one query: local hits first, then web hits that
/// were not seen before, then [`SearchEvent::Done`].
///
/// The web backend is only invoked once the local hits have been drained, and
/// dropping the stream early stops any further network access.
pub struct ResultStream {
    phase: SearchPhase,
    query: String,
    local: VecDeque<Document>,
    web: Arc<dyn WebSearch>,
    web_results: Option<WebResults>,
    max_results: usize,
    seen: HashSet<String>,
    emitted: usize,
}

impl ResultStream {
    fn new(
        query: String,
        local: Vec<Document>,
        web: Arc<dyn WebSearch>,
        max_results: usize,
    ) -> Self {
        ResultStream {
            phase: SearchPhase::Idle,
            query,
            local: local.into(),
            web,
            web_results: None,
            max_results,
            seen: HashSet::new(),
            emitted: 0,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Documents emitted so far, error sentinels excluded.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Drains the stream into `tx`, typically from a worker thread. Stops
    /// quietly once the receiving side is gone.
    pub fn forward(self, tx: Sender<SearchEvent>) {
        for event in self {
            if tx.send(event).is_err() {
                debug!("Result consumer went away, stopping search");
                return;
            }
        }
    }

    fn next_web(&mut self) -> Option<SearchEvent> {
        let web = self.web_results.as_mut()?;
        for mut doc in web.by_ref() {
            if doc.is_error() {
                debug!("Passing through web backend error: {}", doc.title);
                return Some(SearchEvent::Hit(doc));
            }
            if !self.seen.insert(doc.url.clone()) {
                debug!("Dropping duplicate web result {}", doc.url);
                continue;
            }
            if doc.origin() != Origin::Web {
                doc.source = WEB_SOURCE.to_string();
            }
            self.emitted += 1;
            return Some(SearchEvent::Hit(doc));
        }
        None
    }
}

impl Iterator for ResultStream {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<SearchEvent> {
        match self.phase {
            SearchPhase::Idle => {
                self.phase = SearchPhase::Local;
                Some(SearchEvent::Phase(SearchPhase::Local))
            }
            SearchPhase::Local => {
                if let Some(doc) = self.local.pop_front() {
                    self.seen.insert(doc.url.clone());
                    self.emitted += 1;
                    return Some(SearchEvent::Hit(doc));
                }
                self.phase = SearchPhase::Web;
                self.web_results = Some(self.web.search(&self.query, self.max_results));
                Some(SearchEvent::Phase(SearchPhase::Web))
            }
            SearchPhase::Web => {
                if let Some(event) = self.next_web() {
                    return Some(event);
                }
                self.web_results = None;
                self.phase = SearchPhase::Done;
                info!(
                    "Search for '{}' finished with {} results.",
                    self.query, self.emitted
                );
                Some(SearchEvent::Done {
                    total: self.emitted,
                })
            }
            SearchPhase::Done => None,
        }
    }
}

/// Entry point for a presentation layer: run queries, open results.
pub struct NoteFinder {
    store: Box<dyn DocumentStore + Send>,
    web: Arc<dyn WebSearch>,
    documents: Vec<Document>,
    last_query: Option<String>,
    max_results: usize,
}

impl NoteFinder {
    /// Creates a finder over `store`, loading its current documents.
    pub fn new(
        store: Box<dyn DocumentStore + Send>,
        web: Arc<dyn WebSearch>,
    ) -> Result<Self, StoreError> {
        let documents = store.load()?;
        info!("NoteFinder ready with {} local documents", documents.len());
        Ok(NoteFinder {
            store,
            web,
            documents,
            last_query: None,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Current in-memory snapshot of the knowledge base.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Reloads the snapshot from the store.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.documents = self.store.load()?;
        debug!("Refreshed snapshot: {} documents", self.documents.len());
        Ok(())
    }

    /// Starts a search. A blank query is rejected before any store or
    /// network access.
    pub fn run_query(&mut self, query: &str) -> Result<ResultStream, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        self.last_query = Some(query.to_string());
        let local = search_local(query, &self.documents);
        info!("Query '{}': {} local matches", query, local.len());
        Ok(ResultStream::new(
            query.to_string(),
            local,
            Arc::clone(&self.web),
            self.max_results,
        ))
    }

    /// Like [`NoteFinder::open`], with `query` taken as the query that led to `doc`.
    pub fn open_for_query(
        &mut self,
        doc: &Document,
        query: &str,
    ) -> Result<OpenOutcome, StoreError> {
        let query = query.trim();
        if !query.is_empty() {
            self.last_query = Some(query.to_string());
        }
        self.open(doc)
    }

    /// Records that the user opened `doc`. Web results are added to the
    /// knowledge base with keywords from the last query, and the snapshot is
    /// refreshed.
    pub fn open(&mut self, doc: &Document) -> Result<OpenOutcome, StoreError> {
        if doc.url.is_empty() {
            return Ok(OpenOutcome::Ignored);
        }
        match doc.origin() {
            Origin::Error => Ok(OpenOutcome::Ignored),
            Origin::Local => Ok(OpenOutcome::Local),
            Origin::Web => {
                let query = self.last_query.clone().unwrap_or_default();
                let added = self.store.append_if_absent(doc, &query)?;
                self.refresh()?;
                Ok(if added {
                    OpenOutcome::Persisted
                } else {
                    OpenOutcome::AlreadyStored
                })
            }
        }
    }
}
