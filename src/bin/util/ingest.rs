use log::{debug, info};
use notesearch::{Document, DocumentStore};

use std::collections::HashSet;
use std::path::Path;

pub struct ImportResult {
    pub imported_count: usize,
    pub skipped_count: usize,
    pub failed_files: Vec<String>,
    pub total_document_count: usize,
}

impl ImportResult {
    pub fn new() -> Self {
        ImportResult {
            imported_count: 0,
            skipped_count: 0,
            failed_files: Vec::new(),
            total_document_count: 0,
        }
    }

    fn add_failure(&mut self, file_path: &Path, error: &anyhow::Error) {
        self.failed_files
            .push(file_path.to_string_lossy().to_string() + ": " + &error.to_string());
        debug!("Failed to process file {:?}: {}", file_path, error);
    }
}

/// Collects the seed files under `path_str`: the file itself, or every
/// `.json` file directly inside the directory, sorted by name.
fn seed_files(path_str: &str) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let path = Path::new(path_str);
    if !path.exists() {
        return Err(anyhow::anyhow!("Path '{}' does not exist", path_str));
    }
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files: Vec<_> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|file_path| {
            file_path.is_file()
                && file_path.extension().and_then(|s| s.to_str()) == Some("json")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Seeds the knowledge base from JSON files holding arrays of documents.
///
/// Seed records are taken as they are (titles and keywords are not derived);
/// records whose URL is already stored, or which have no URL, are skipped.
pub struct JsonSeedImporter {
    pub store: Box<dyn DocumentStore>,
}

impl JsonSeedImporter {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        JsonSeedImporter { store }
    }

    pub fn import(&self, path_str: &str) -> anyhow::Result<ImportResult> {
        let files = seed_files(path_str)?;
        info!("Importing {} seed file(s) from {}", files.len(), path_str);

        let mut records = self.store.load()?;
        let mut known: HashSet<String> = records.iter().map(|d| d.url.clone()).collect();
        let mut result = ImportResult::new();

        for (index, file_path) in files.iter().enumerate() {
            println!(
                "Processing file {} of {}: {}",
                index + 1,
                files.len(),
                file_path.file_name().unwrap_or_default().to_string_lossy()
            );
            match Self::read_seed_file(file_path) {
                Ok(docs) => {
                    for doc in docs {
                        if doc.url.is_empty() || !known.insert(doc.url.clone()) {
                            result.skipped_count += 1;
                            continue;
                        }
                        records.push(doc);
                        result.imported_count += 1;
                    }
                }
                Err(e) => {
                    println!("✗ Failed to process: {:?} - {}", file_path, e);
                    result.add_failure(file_path, &e);
                }
            }
        }

        if result.imported_count > 0 {
            self.store.save(&records)?;
        }
        result.total_document_count = records.len();
        Ok(result)
    }

    fn read_seed_file(file_path: &Path) -> anyhow::Result<Vec<Document>> {
        let data = std::fs::read_to_string(file_path)?;
        let docs: Vec<Document> = serde_json::from_str(&data)?;
        Ok(docs)
    }
}
