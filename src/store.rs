//! Schema reference store.
//!
//! Turns `$ref` text into [`ResolvedSchema`]s held in an arena for the
//! lifetime of one compilation run. Repeated references to the same target
//! return the same [`SchemaId`], so callers can detect cycles by comparing ids.
pub mod source;

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ResolutionError;
use crate::fragment::{resolve_segments, FragmentResolver};

pub use source::{DocumentSource, FileSystemDocuments, InMemoryDocuments};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Locator of one loaded document (a path, a URI, or an in-memory name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(String);

/// `(document, decoded fragment segments)`; structural equality, used as cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaReference {
    pub document: DocumentId,
    pub fragment: Vec<String>,
}

/// Arena index of a [`ResolvedSchema`] inside a [`SchemaStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub reference: SchemaReference,
    /// Copy of the subtree the reference points at.
    pub content: Value,
    /// The schema holding the `$ref` that first created this entry. Lookup only.
    pub parent: Option<SchemaId>,
}

pub struct SchemaStore {
    source: Box<dyn DocumentSource>,
    resolver: FragmentResolver,
    documents: IndexMap<DocumentId, Value>,
    schemas: Vec<ResolvedSchema>,
    index: HashMap<SchemaReference, SchemaId>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DocumentId {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve `locator` relative to this document's directory. Absolute
    /// paths and URIs are taken as-is.
    pub fn join(&self, locator: &str) -> DocumentId {
        if locator.is_empty() {
            return self.clone();
        }
        if locator.contains("://") || locator.starts_with('/') {
            return DocumentId::new(locator);
        }
        let base_dir = match self.0.rfind('/') {
            Some(at) => &self.0[..=at],
            None => "",
        };
        DocumentId::new(normalize_dots(&format!("{base_dir}{locator}")))
    }

    /// Last path component without its extension.
    pub fn stem(&self) -> &str {
        let file = self.0.rsplit('/').next().unwrap_or(&self.0);
        match file.find('.') {
            Some(0) | None => file,
            Some(at) => &file[..at],
        }
    }
}

fn normalize_dots(path: &str) -> String {
    // scheme and authority are never popped
    let (prefix, rest) = match path.find("://") {
        Some(at) => {
            let authority = at + 3;
            let end = path[authority..].find('/').map_or(path.len(), |i| authority + i);
            path.split_at(end)
        }
        None => ("", path),
    };
    let absolute = rest.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|p| *p != "..") => {
                parts.pop();
            }
            ".." if absolute && parts.is_empty() => {}
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("{prefix}/{joined}")
    } else {
        format!("{prefix}{joined}")
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SchemaReference {
    pub fn root(document: DocumentId) -> Self {
        Self { document, fragment: Vec::new() }
    }
}

impl fmt::Display for SchemaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#/{}", self.document, self.fragment.join("/"))
    }
}

impl SchemaStore {
    pub fn new(source: impl DocumentSource + 'static, resolver: FragmentResolver) -> Self {
        Self {
            source: Box::new(source),
            resolver,
            documents: IndexMap::new(),
            schemas: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register the root of `document` (no parent).
    pub fn root(&mut self, document: &DocumentId) -> Result<SchemaId, ResolutionError> {
        self.intern(SchemaReference::root(document.clone()), None)
    }

    /// Resolve `ref_text` (`<locator>#<fragment>`) found inside `parent`.
    /// An empty locator targets the parent's own document.
    pub fn create(&mut self, parent: SchemaId, ref_text: &str) -> Result<SchemaId, ResolutionError> {
        let (locator, fragment) = match ref_text.find('#') {
            Some(at) => ref_text.split_at(at),
            None => (ref_text, ""),
        };
        let base = &self[parent].reference.document;
        let document = if locator.is_empty() {
            base.clone()
        } else {
            self.source.locate(base, locator)?
        };
        let fragment = self.resolver.segments(fragment)?;
        trace!(%ref_text, parent = %self[parent].reference, "resolving $ref");
        self.intern(SchemaReference { document, fragment }, Some(parent))
    }

    pub fn get(&self, id: SchemaId) -> &ResolvedSchema {
        &self.schemas[id.0]
    }

    pub fn lookup(&self, reference: &SchemaReference) -> Option<SchemaId> {
        self.index.get(reference).copied()
    }

    pub fn parent(&self, id: SchemaId) -> Option<&ResolvedSchema> {
        self[id].parent.map(|p| &self[p])
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn intern(
        &mut self,
        reference: SchemaReference,
        parent: Option<SchemaId>,
    ) -> Result<SchemaId, ResolutionError> {
        if let Some(id) = self.index.get(&reference) {
            return Ok(*id);
        }
        let tree = self.document(&reference.document)?;
        let content = resolve_segments(tree, &reference.fragment)?.clone();
        let id = SchemaId(self.schemas.len());
        debug!(%reference, ?id, "new resolved schema");
        self.index.insert(reference.clone(), id);
        self.schemas.push(ResolvedSchema { reference, content, parent });
        Ok(id)
    }

    fn document(&mut self, document: &DocumentId) -> Result<&Value, ResolutionError> {
        if !self.documents.contains_key(document) {
            let tree = self.source.fetch(document)?;
            debug!(%document, "loaded document");
            self.documents.insert(document.clone(), tree);
        }
        self.documents
            .get(document)
            .ok_or_else(|| ResolutionError::DocumentNotFound { document: document.clone() })
    }
}

impl Index<SchemaId> for SchemaStore {
    type Output = ResolvedSchema;

    fn index(&self, id: SchemaId) -> &ResolvedSchema {
        self.get(id)
    }
}
