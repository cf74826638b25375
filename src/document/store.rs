//! Document tables keyed by id.
//!
//! [`MemoryDocumentStore`] keeps everything in process. [`FileDocumentStore`] keeps the same
//! table and snapshots it to a JSON file after every mutation (temp file + rename).

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::{DocumentError, DocumentResult};
use super::model::ProcessedDocument;

/// A single table of documents keyed by [`ProcessedDocument::id`].
pub trait DocumentStore: Send + Sync {
    /// Inserts or replaces a document.
    fn put(&self, document: ProcessedDocument) -> DocumentResult<()>;

    fn get(&self, id: &str) -> Option<ProcessedDocument>;

    /// Removes a document, returning it if it existed.
    fn delete(&self, id: &str) -> DocumentResult<Option<ProcessedDocument>>;

    /// All documents, newest upload first.
    fn list(&self) -> Vec<ProcessedDocument>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `f` to a stored document and writes it back.
    fn update(
        &self,
        id: &str,
        f: &mut dyn FnMut(&mut ProcessedDocument) -> DocumentResult<()>,
    ) -> DocumentResult<ProcessedDocument> {
        let mut document = self
            .get(id)
            .ok_or_else(|| DocumentError::NotFound { id: id.to_string() })?;
        f(&mut document)?;
        self.put(document.clone())?;
        Ok(document)
    }

    /// Deletes documents whose `updated_at` is older than `max_age` relative to `now`.
    fn cleanup_expired(
        &self,
        max_age: std::time::Duration,
        now: DateTime<Utc>,
    ) -> DocumentResult<usize> {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let expired: Vec<String> = self
            .list()
            .into_iter()
            .filter(|doc| now.signed_duration_since(doc.updated_at) > max_age)
            .map(|doc| doc.id)
            .collect();

        let mut removed = 0;
        for id in expired {
            if self.delete(&id)?.is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "Cleaned up expired documents");
        }
        Ok(removed)
    }
}

fn sorted_newest_first(table: &HashMap<String, ProcessedDocument>) -> Vec<ProcessedDocument> {
    let mut docs: Vec<_> = table.values().cloned().collect();
    docs.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    docs
}

/// In-memory document table.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, ProcessedDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = ProcessedDocument>) -> Self {
        let table = documents
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect();
        Self {
            documents: RwLock::new(table),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put(&self, document: ProcessedDocument) -> DocumentResult<()> {
        self.documents.write().insert(document.id.clone(), document);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<ProcessedDocument> {
        self.documents.read().get(id).cloned()
    }

    fn delete(&self, id: &str) -> DocumentResult<Option<ProcessedDocument>> {
        Ok(self.documents.write().remove(id))
    }

    fn list(&self) -> Vec<ProcessedDocument> {
        sorted_newest_first(&self.documents.read())
    }

    fn len(&self) -> usize {
        self.documents.read().len()
    }
}

/// Document table persisted as a JSON array.
#[derive(Debug)]
pub struct FileDocumentStore {
    path: PathBuf,
    documents: RwLock<HashMap<String, ProcessedDocument>>,
}

impl FileDocumentStore {
    /// Opens the store at `path`, loading any existing snapshot. A missing file is an empty table.
    pub fn open(path: impl Into<PathBuf>) -> DocumentResult<Self> {
        let path = path.into();
        let table = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => {
                let docs: Vec<ProcessedDocument> = serde_json::from_slice(&bytes)?;
                docs.into_iter().map(|doc| (doc.id.clone(), doc)).collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), documents = table.len(), "Opened document store");

        Ok(Self {
            path,
            documents: RwLock::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, table: &HashMap<String, ProcessedDocument>) -> DocumentResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let docs = sorted_newest_first(table);
        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, &docs)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| DocumentError::PersistFailed {
                path: self.path.clone(),
                reason: e.error.to_string(),
            })?;

        debug!(path = %self.path.display(), documents = docs.len(), "Wrote document store");
        Ok(())
    }
}

impl DocumentStore for FileDocumentStore {
    fn put(&self, document: ProcessedDocument) -> DocumentResult<()> {
        let mut table = self.documents.write();
        let id = document.id.clone();
        let previous = table.insert(id.clone(), document);
        if let Err(e) = self.flush(&table) {
            // Keep memory and disk in agreement.
            match previous {
                Some(prev) => table.insert(id, prev),
                None => table.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Option<ProcessedDocument> {
        self.documents.read().get(id).cloned()
    }

    fn delete(&self, id: &str) -> DocumentResult<Option<ProcessedDocument>> {
        let mut table = self.documents.write();
        let Some(removed) = table.remove(id) else {
            return Ok(None);
        };
        if let Err(e) = self.flush(&table) {
            table.insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    fn list(&self) -> Vec<ProcessedDocument> {
        sorted_newest_first(&self.documents.read())
    }

    fn len(&self) -> usize {
        self.documents.read().len()
    }
}
