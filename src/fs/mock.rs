// src/fs/mock.rs

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use tracing::warn;

use super::FileSystem;

#[derive(Debug, Default)]
struct Storage {
    files: BTreeMap<PathBuf, Vec<u8>>,
    /// Directories whose contents cannot be listed or read.
    unreadable: BTreeSet<PathBuf>,
}

impl Storage {
    fn locked_dir(&self, path: &Path) -> Option<&PathBuf> {
        self.unreadable.iter().find(|dir| path.starts_with(dir))
    }
}

/// In-memory filesystem.
///
/// Only files are stored; a directory exists whenever some file lives below
/// it. Clones share the same storage, so a test can keep a handle and inspect
/// what the pipeline appended.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    storage: Arc<Mutex<Storage>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.lock()
            .files
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Make everything below `dir` unreadable, like a directory without
    /// read permission.
    pub fn lock_dir(&self, dir: impl AsRef<Path>) {
        self.lock().unreadable.insert(dir.as_ref().to_path_buf());
    }

    /// Contents of a file as UTF-8, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock()
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn lock(&self) -> MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let storage = self.lock();
        if let Some(dir) = storage.locked_dir(path) {
            return Err(anyhow!("Permission denied: {:?} (below {:?})", path, dir));
        }
        match storage.files.get(path) {
            Some(content) => Ok(Box::new(Cursor::new(content.clone()))),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn append(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.lock()
            .files
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(contents);
        Ok(())
    }

    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let storage = self.lock();
        if let Some(dir) = storage.locked_dir(root) {
            return Err(anyhow!("Permission denied: {:?} (below {:?})", root, dir));
        }

        let below_root = storage
            .files
            .keys()
            .filter(|file| *file != root && file.starts_with(root));

        let mut found = Vec::new();
        let mut skipped = BTreeSet::new();
        let mut any = false;
        for file in below_root {
            any = true;
            match storage.locked_dir(file) {
                Some(dir) => {
                    if skipped.insert(dir.clone()) {
                        warn!(root = ?root, path = ?dir, "skipping unreadable entry");
                    }
                }
                None => found.push(file.clone()),
            }
        }

        if !any {
            return Err(anyhow!("Not a directory or not found: {:?}", root));
        }
        Ok(found)
    }
}
