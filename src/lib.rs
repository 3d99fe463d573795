//! Variant-aware indexing and search for multi-version documents.
//!
//! A multi-version document stores every version of a text as one graph of
//! fragments, each shared by a set of versions. This crate builds a per
//! project inverted index over such documents and answers keyword and
//! literal-phrase queries with HTML snippets taken from a version in which
//! all the matched words actually occur.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod graph;
pub mod index;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use config::{EngineSettings, IndexSettings, MatchSettings, StopwordSource};
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use format::{Hit, HitPage};
pub use graph::{VariantGraph, VersionInfo};
pub use index::{InvertedIndex, NoProgress, ProgressSink};
pub use query::{Match, MatchType, Query};
pub use store::{DirectoryStore, DocumentStore, MemoryStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
