use thiserror::Error;

/// Main error type for indexing and search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Malformed variant graph: {0}")]
    MalformedGraph(String),

    #[error("Invalid document {docid}: {reason}")]
    InvalidDocument { docid: String, reason: String },

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("No dictionary found for language {0}")]
    DictionaryNotFound(String),

    #[error("No index built for project {0}")]
    IndexNotFound(String),

    #[error("Corrupt index blob: {0}")]
    CorruptIndex(String),

    #[error("Index format error: incompatible version {actual}, expected <= {expected}")]
    IncompatibleIndex { expected: u32, actual: u32 },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Errors confined to a single input document. A build logs these and
    /// carries on with the rest of the collection.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SearchError::MalformedGraph(_)
                | SearchError::InvalidDocument { .. }
                | SearchError::UnknownLanguage(_)
                | SearchError::DictionaryNotFound(_)
                | SearchError::Json(_)
        )
    }

    /// Errors that mean the stored index must be rebuilt
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self,
            SearchError::CorruptIndex(_)
                | SearchError::IncompatibleIndex { .. }
                | SearchError::Serialization(_)
        )
    }

    /// One-line message fit for an end user
    pub fn user_message(&self) -> String {
        match self {
            SearchError::IndexNotFound(project) => {
                format!("No search index exists for {}", project)
            }
            SearchError::CorruptIndex(_)
            | SearchError::IncompatibleIndex { .. }
            | SearchError::Serialization(_) => {
                "The search index is unreadable and must be rebuilt".to_string()
            }
            SearchError::Io(_) => "The document store could not be read".to_string(),
            other => other.to_string(),
        }
    }
}
