//! Where documents come from. Locating and fetching are pluggable; the store
//! only asks for a tree per [`DocumentId`].
use std::io::ErrorKind;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

use super::DocumentId;
use crate::error::ResolutionError;

pub trait DocumentSource {
    /// Turn a `$ref` locator found in `base` into a document id.
    fn locate(&self, base: &DocumentId, locator: &str) -> Result<DocumentId, ResolutionError> {
        Ok(base.join(locator))
    }

    fn fetch(&self, document: &DocumentId) -> Result<Value, ResolutionError>;
}

/// Documents supplied up front, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocuments {
    documents: IndexMap<DocumentId, Value>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tree: Value) {
        self.documents.insert(DocumentId::new(name), tree);
    }

    pub fn with(mut self, name: impl Into<String>, tree: Value) -> Self {
        self.insert(name, tree);
        self
    }
}

impl DocumentSource for InMemoryDocuments {
    fn fetch(&self, document: &DocumentId) -> Result<Value, ResolutionError> {
        self.documents
            .get(document)
            .cloned()
            .ok_or_else(|| ResolutionError::DocumentNotFound { document: document.clone() })
    }
}

/// Local JSON files; ids are file paths (a `file://` prefix is accepted).
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemDocuments;

impl DocumentSource for FileSystemDocuments {
    fn fetch(&self, document: &DocumentId) -> Result<Value, ResolutionError> {
        let locator = document.as_str();
        if locator.contains("://") && !locator.starts_with("file://") {
            return Err(ResolutionError::DocumentLoad {
                document: document.clone(),
                reason: "only local files can be loaded".to_string(),
            });
        }
        let path = PathBuf::from(locator.trim_start_matches("file://"));
        let bytes = std::fs::read(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => ResolutionError::DocumentNotFound { document: document.clone() },
            _ => ResolutionError::DocumentLoad {
                document: document.clone(),
                reason: error.to_string(),
            },
        })?;
        serde_json::from_slice(&bytes).map_err(|error| ResolutionError::DocumentLoad {
            document: document.clone(),
            reason: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_system_rejects_remote_and_missing() {
        let remote = FileSystemDocuments.fetch(&DocumentId::new("https://example.com/s.json"));
        assert!(matches!(remote, Err(ResolutionError::DocumentLoad { .. })));

        let missing = FileSystemDocuments.fetch(&DocumentId::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(ResolutionError::DocumentNotFound { .. })));
    }

    #[test]
    fn file_system_reads_json() {
        let dir = std::env::temp_dir().join(format!("json-typemodel-src-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.json");
        std::fs::write(&path, r#"{"type": "string"}"#).unwrap();
        let tree = FileSystemDocuments
            .fetch(&DocumentId::new(path.to_string_lossy().to_string()))
            .unwrap();
        assert_eq!(tree["type"], "string");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
