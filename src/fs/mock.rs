// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

/// In-memory filesystem keyed by path, storing only modification times.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, SystemTime>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file with an explicit modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.insert(path.as_ref().to_path_buf(), modified);
    }

    /// Add a file whose modification time is `secs` after the Unix epoch.
    pub fn add_file_at(&self, path: impl AsRef<Path>, secs: u64) {
        self.add_file(path, SystemTime::UNIX_EPOCH + Duration::from_secs(secs));
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.remove(path.as_ref());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .copied()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }
}
