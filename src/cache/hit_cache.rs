use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::format::HitPage;
use crate::graph::VersionInfo;

/// Write-once cache of result pages on disk, one JSON file per key.
///
/// Failures are logged and treated as misses.
pub struct HitCache {
    dir: PathBuf,
}

impl HitCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 over everything that shapes a result page
    pub fn key(
        project: &str,
        generation: u64,
        query: &str,
        first_hit: usize,
        pin: Option<&VersionInfo>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(project.as_bytes());
        hasher.update([0u8]);
        hasher.update(generation.to_le_bytes());
        hasher.update(query.as_bytes());
        hasher.update([0u8]);
        hasher.update((first_hit as u64).to_le_bytes());
        if let Some(pin) = pin {
            hasher.update(pin.group.as_bytes());
            hasher.update([0u8]);
            hasher.update(pin.name.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    pub fn retrieve(&self, key: &str) -> Option<HitPage> {
        let json = match fs::read_to_string(self.path(key)) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable hit cache entry");
                return None;
            }
        };
        match HitPage::from_json(&json) {
            Ok(page) => {
                debug!(key = %key, "Hit cache hit");
                Some(page)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt hit cache entry");
                None
            }
        }
    }

    /// Store `page` unless the key is already present
    pub fn store(&self, key: &str, page: &HitPage) {
        if self.exists(key) {
            return;
        }
        if let Err(e) = self.write(key, page) {
            warn!(key = %key, error = %e, "Failed to write hit cache entry");
        }
    }

    fn write(&self, key: &str, page: &HitPage) -> Result<()> {
        let json = page.to_json()?;
        let tmp = self.dir.join(format!("{}.tmp", key));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
        }
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}
