use crate::error::StoreError;
use crate::text::{derive_keywords, normalize_title};
use crate::traits::{Document, DocumentStore, WEB_SOURCE};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// Knowledge base kept as one pretty-printed JSON array of [`Document`]s.
pub struct JsonDocumentStore {
    path: PathBuf,
}

impl JsonDocumentStore {
    /// Creates a store backed by the file at `path`. Nothing is touched on disk
    /// until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Using JSON knowledge base at: {:?}", path);
        JsonDocumentStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        Ok(())
    }

    fn encode(records: &[Document]) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Reads and parses the store file, distinguishing corruption from I/O failures.
    fn read_records(&self) -> Result<Option<Vec<Document>>, StoreError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| StoreError::Corruption {
                path: self.path.clone(),
                source,
            })
    }
}

impl DocumentStore for JsonDocumentStore {
    /// Loads all documents. A missing file is created empty; a corrupt file
    /// reads as an empty store.
    fn load(&self) -> Result<Vec<Document>, StoreError> {
        match self.read_records() {
            Ok(Some(records)) => {
                debug!("Loaded {} documents from {:?}", records.len(), self.path);
                Ok(records)
            }
            Ok(None) => {
                info!("Knowledge base {:?} not found, creating an empty one", self.path);
                self.save(&[])?;
                Ok(Vec::new())
            }
            Err(e @ StoreError::Corruption { .. }) => {
                warn!("{}; treating the knowledge base as empty", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes all documents to a sibling temporary file and renames it over the
    /// store file, so readers never see a half-written store.
    fn save(&self, records: &[Document]) -> Result<(), StoreError> {
        self.ensure_parent_dir()?;
        let bytes = Self::encode(records)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        debug!("Saved {} documents to {:?}", records.len(), self.path);
        Ok(())
    }

    /// Adds a cleaned copy of `doc` with derived keywords unless its URL is
    /// already stored.
    fn append_if_absent(&self, doc: &Document, query: &str) -> Result<bool, StoreError> {
        let mut records = self.load()?;

        if records.iter().any(|d| d.url == doc.url) {
            info!("Document {} is already in the knowledge base.", doc.url);
            return Ok(false);
        }

        let mut title = normalize_title(&doc.title);
        if title.is_empty() {
            title = "Untitled".to_string();
        }
        let keywords = derive_keywords(&title, query).into_iter().collect();

        let new_doc = Document {
            id: if doc.id.is_empty() {
                "WEB-SRC".to_string()
            } else {
                doc.id.clone()
            },
            title,
            url: doc.url.clone(),
            keywords,
            source: if doc.source.is_empty() {
                WEB_SOURCE.to_string()
            } else {
                doc.source.clone()
            },
        };
        info!("Document '{}' added to the knowledge base.", new_doc.title);
        records.push(new_doc);
        self.save(&records)?;
        Ok(true)
    }

    /// Returns the number of stored documents.
    fn len(&self) -> Result<usize, StoreError> {
        let count = self.load()?.len();
        info!("Total documents stored: {}", count);
        Ok(count)
    }
}
