//! Skill store implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::infrastructure::traits::{FileLock, FileSystem, SkillStore, StoreSnapshot};

/// Process-lifetime store; the snapshot lives as long as the store value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }
}

fn poisoned<T>(_: T) -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory store lock poisoned")
}

impl SkillStore for MemoryStore {
    fn load(&self) -> io::Result<StoreSnapshot> {
        Ok(self.snapshot.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, snapshot: &StoreSnapshot) -> io::Result<()> {
        *self.snapshot.lock().map_err(poisoned)? = snapshot.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// JSON snapshot on disk.
///
/// Saves go through a uniquely named sibling temp file that is renamed over
/// the target, so a crash mid-write leaves the previous snapshot intact.
/// Mutations are serialized across processes by an advisory lock on
/// `<snapshot>.lock`.
pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }
}

impl SkillStore for JsonFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> io::Result<StoreSnapshot> {
        if !self.fs.exists(&self.path) {
            debug!("no snapshot yet, starting empty");
            return Ok(StoreSnapshot::default());
        }
        let content = self.fs.read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreSnapshot::default());
        }
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    #[instrument(level = "debug", skip(self, snapshot), fields(path = %self.path.display()))]
    fn save(&self, snapshot: &StoreSnapshot) -> io::Result<()> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.fs.ensure_parent(&self.path)?;
        self.fs.write_atomic(&self.path, &content)?;
        debug!(
            "saved {} owners, {} skills",
            snapshot.owners.len(),
            snapshot.skills.len()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    #[instrument(level = "trace", skip(self), fields(path = %self.path.display()))]
    fn lock(&self) -> io::Result<FileLock> {
        self.fs.ensure_parent(&self.path)?;
        self.fs.lock_exclusive(&self.lock_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Level, OwnerId, Position, Skill};
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    fn snapshot() -> StoreSnapshot {
        StoreSnapshot {
            owners: vec![],
            skills: vec![Skill {
                id: "root".into(),
                name: "Core".into(),
                level: Level::MAX,
                pos: Position::new(400, 50),
                parent: None,
                owner: OwnerId::from("local"),
            }],
        }
    }

    #[test]
    fn given_missing_file_when_loading_then_empty_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(Arc::new(RealFileSystem), temp.path().join("skills.json"));

        assert_eq!(store.load().unwrap(), StoreSnapshot::default());
    }

    #[test]
    fn given_saved_snapshot_when_loading_then_same_content_and_no_temp_left() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("skills.json");
        let store = JsonFileStore::new(Arc::new(RealFileSystem), &path);

        store.save(&snapshot()).unwrap();

        assert_eq!(store.load().unwrap(), snapshot());
        let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != "skills.json")
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
    }

    #[test]
    fn given_json_store_when_locked_then_lock_file_beside_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(Arc::new(RealFileSystem), temp.path().join("skills.json"));

        let lock = store.lock().unwrap();

        assert!(lock.is_held());
        assert!(temp.path().join("skills.json.lock").exists());
        drop(lock);
        // released locks can be taken again
        assert!(store.lock().unwrap().is_held());
    }

    #[test]
    fn given_memory_store_when_locked_then_nothing_held() {
        assert!(!MemoryStore::new().lock().unwrap().is_held());
    }

    #[test]
    fn given_corrupt_file_when_loading_then_invalid_data() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("skills.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(Arc::new(RealFileSystem), &path);

        let err = store.load().unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn given_memory_store_when_saved_then_load_returns_copy() {
        let store = MemoryStore::new();
        store.save(&snapshot()).unwrap();

        assert_eq!(store.load().unwrap().skills.len(), 1);
    }
}
