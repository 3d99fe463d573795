//! Document store collaborator
//!
//! Documents, their metadata and built index blobs live in named
//! collections of a key-value store. Two backends are provided: an in-memory
//! map and a directory tree.

mod fs_store;
mod memory;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::graph::VariantGraph;

pub use fs_store::DirectoryStore;
pub use memory::MemoryStore;

/// Documents to index
pub const CORTEX: &str = "cortex";
/// Title records
pub const METADATA: &str = "metadata";
/// Built index blobs, keyed by project
pub const INDICES: &str = "indices";

/// Key-value store holding opaque blobs in named collections
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>>;

    /// Ids in `collection` starting with `prefix`, sorted
    fn list(&self, collection: &str, prefix: &str) -> Result<Vec<String>>;

    fn put(&self, collection: &str, id: &str, blob: &[u8]) -> Result<()>;
}

/// Body of a stored document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum DocumentBody {
    /// Multi-version document
    Mvd { graph: VariantGraph },
    /// Plain single-version text
    Text { text: String },
}

impl DocumentBody {
    /// The body as a variant graph; plain text becomes a one-version graph
    pub fn into_graph(self) -> VariantGraph {
        match self {
            DocumentBody::Mvd { graph } => graph,
            DocumentBody::Text { text } => VariantGraph::single_version(text),
        }
    }
}

/// JSON record in the `cortex` collection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub body: DocumentBody,
}

impl StoredDocument {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// JSON record in the `metadata` collection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub section: Option<String>,
    pub subsection: Option<String>,
}

impl DocumentMetadata {
    /// `title section, subsection`, when a title is present
    pub fn display_title(&self) -> Option<String> {
        let mut title = self.title.clone()?;
        if let Some(section) = &self.section {
            title.push(' ');
            title.push_str(section);
        }
        if let Some(subsection) = &self.subsection {
            title.push_str(", ");
            title.push_str(subsection);
        }
        Some(title)
    }
}

pub fn load_document(store: &dyn DocumentStore, docid: &str) -> Result<StoredDocument> {
    let bytes = store
        .get(CORTEX, docid)?
        .ok_or_else(|| SearchError::DocumentNotFound(docid.to_string()))?;
    StoredDocument::from_json(&bytes).map_err(|e| SearchError::InvalidDocument {
        docid: docid.to_string(),
        reason: e.to_string(),
    })
}

pub fn load_metadata(store: &dyn DocumentStore, docid: &str) -> Result<Option<DocumentMetadata>> {
    match store.get(METADATA, docid)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Display title: metadata record, then the document's own title, then the docid
pub fn document_title(store: &dyn DocumentStore, docid: &str) -> Result<String> {
    if let Some(title) = load_metadata(store, docid)?.and_then(|m| m.display_title()) {
        return Ok(title);
    }
    let title = match store.get(CORTEX, docid)? {
        Some(bytes) => StoredDocument::from_json(&bytes).ok().and_then(|d| d.title),
        None => None,
    };
    Ok(title.unwrap_or_else(|| docid.to_string()))
}
