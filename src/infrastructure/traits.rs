//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::{Owner, Skill};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Replace file content via a temp file in the same directory, so readers
    /// never observe a partial write.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Open (creating if needed) and exclusively lock `path`; blocks until
    /// the lock is granted.
    fn lock_exclusive(&self, path: &Path) -> io::Result<FileLock>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Exclusive advisory lock on a file, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: Option<File>,
}

impl FileLock {
    /// Take ownership of an already locked file.
    pub fn held(file: File) -> Self {
        Self { file: Some(file) }
    }

    /// Lock that guards nothing, for stores with no state shared across processes.
    pub fn none() -> Self {
        Self { file: None }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // closing the handle releases the lock as well
            let _ = FileExt::unlock(&file);
        }
    }
}

/// Everything a store persists: the owner registry and all skill records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub owners: Vec<Owner>,
    /// Skill records, parents before children
    pub skills: Vec<Skill>,
}

/// Persistence boundary for skill trees.
///
/// Stores move whole snapshots; tree invariants (cascade, parent scoping)
/// are enforced above this layer, independent of the backing store.
pub trait SkillStore: Send + Sync {
    /// Load the current snapshot; an uninitialized store yields an empty one.
    fn load(&self) -> io::Result<StoreSnapshot>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &StoreSnapshot) -> io::Result<()>;

    /// Short description for logs and `info` output.
    fn describe(&self) -> String;

    /// Exclusive lock held across load, change and save of one mutation.
    ///
    /// Stores whose snapshot can be shared between processes must override
    /// this; the default guards nothing.
    fn lock(&self) -> io::Result<FileLock> {
        Ok(FileLock::none())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // dropped without persist, the temp file is removed
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    fn lock_exclusive(&self, path: &Path) -> io::Result<FileLock> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(FileLock::held(file))
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
