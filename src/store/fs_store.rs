use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::DocumentStore;
use crate::error::Result;

/// One file per key under `<root>/<collection>/`
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(escape(collection))
    }

    fn path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(escape(id))
    }
}

/// Keys contain `/`, so they are percent-escaped into flat file names
fn escape(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            _ => out.push(c),
        }
    }
    if out.starts_with('.') {
        out.replace_range(0..1, "%2E");
    }
    out
}

fn unescape(name: &str) -> String {
    name.replace("%2F", "/")
        .replace("%5C", "\\")
        .replace("%2E", ".")
        .replace("%25", "%")
}

impl DocumentStore for DirectoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(collection, id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, collection: &str, prefix: &str) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.collection_dir(collection)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".tmp") {
                continue;
            }
            let id = unescape(&name);
            if id.starts_with(prefix) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn put(&self, collection: &str, id: &str, blob: &[u8]) -> Result<()> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir)?;
        let path = self.path(collection, id);
        let tmp = path.with_file_name(format!("{}.tmp", escape(id)));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(blob)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
