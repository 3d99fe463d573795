use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::DocumentStore;
use crate::error::Result;

/// In-memory store, used by tests and embedders that load documents themselves
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    fn list(&self, collection: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(|c| {
                c.range(prefix.to_string()..)
                    .take_while(|(id, _)| id.starts_with(prefix))
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn put(&self, collection: &str, id: &str, blob: &[u8]) -> Result<()> {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), blob.to_vec());
        Ok(())
    }
}
