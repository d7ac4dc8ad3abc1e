use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for storage writes
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize record {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// Keyed blob storage the engine persists its records through.
///
/// Reads that fail for any reason look like a missing key. Writes report
/// errors, but callers treat persistence as best-effort.
pub trait Storage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    failing: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, as a full or revoked store would.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Successful saves so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Unavailable(format!("save of {} refused", key)));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// `todo:tasks` lives in `todo.tasks.json`. Writes are atomic.
#[derive(Debug, Clone)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| match c {
                ':' => '.',
                '/' | '\\' => '_',
                c => c,
            })
            .collect();
        self.dir.join(format!("{}.json", stem))
    }
}

impl Storage for DirStorage {
    fn load(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir)
            .and_then(|_| atomic_write(&path, value.as_bytes()))
            .map_err(|source| StorageError::WriteError { path, source })
    }
}

/// Write to a temp file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_round_trip_and_failure() {
        let mut store = MemoryStorage::new();
        assert!(store.load("k").is_none());
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").as_deref(), Some("v"));
        assert_eq!(store.writes(), 1);

        store.set_failing(true);
        assert!(store.save("k", "w").is_err());
        assert_eq!(store.load("k").as_deref(), Some("v"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn dir_storage_maps_keys_to_files() {
        let store = DirStorage::new("/data");
        assert_eq!(
            store.path_for("todo:catColors"),
            PathBuf::from("/data/todo.catColors.json")
        );
        assert_eq!(store.path_for("a/b"), PathBuf::from("/data/a_b.json"));
    }

    #[test]
    fn dir_storage_creates_dir_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut store = DirStorage::new(tmp.path().join("nested"));
        assert!(store.load("todo:tasks").is_none());

        store.save("todo:tasks", "[]").unwrap();
        store.save("todo:tasks", "[1]").unwrap();
        assert_eq!(store.load("todo:tasks").as_deref(), Some("[1]"));
        assert_eq!(
            fs::read_to_string(tmp.path().join("nested/todo.tasks.json")).unwrap(),
            "[1]"
        );
    }

    #[test]
    fn dir_storage_write_error_is_reported() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        // a regular file where the directory should be
        let mut store = DirStorage::new(&blocker);
        assert!(matches!(
            store.save("todo:tasks", "[]"),
            Err(StorageError::WriteError { .. })
        ));
    }
}
