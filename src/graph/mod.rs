//! Multi-version document model
//!
//! A document is an ordered sequence of fragments, each tagged with the set
//! of versions it belongs to. Reading the fragments of one version in order
//! reproduces that version's text.

mod variant_graph;
mod version_set;

pub use variant_graph::{Fragment, VariantGraph, VersionInfo};
pub use version_set::{VersionId, VersionSet};
