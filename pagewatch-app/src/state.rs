//! Persisted fingerprint state.
//!
//! The store holds at most one fingerprint; there is no history. It is an
//! explicit, injectable seam so tests can swap the filesystem for memory.

use pagewatch_common::{PagewatchError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait StateStore: Send + Sync {
    /// Trimmed stored fingerprint. A store that has never been written
    /// reads as the empty string, which is the valid first-run state and
    /// guarantees the first check reports a change.
    fn load(&self) -> Result<String>;

    /// Overwrite the store with exactly `fingerprint`. I/O failure is
    /// fatal to the run.
    fn save(&self, fingerprint: &str) -> Result<()>;
}

/// Production store: one plain-text file containing the hex fingerprint.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(PagewatchError::State(e)),
        }
    }

    fn save(&self, fingerprint: &str) -> Result<()> {
        std::fs::write(&self.path, fingerprint)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStateStore {
    value: Mutex<String>,
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<String> {
        Ok(self.value.lock().expect("state lock").trim().to_string())
    }

    fn save(&self, fingerprint: &str) -> Result<()> {
        *self.value.lock().expect("state lock") = fingerprint.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::new(tmp.path().join("state.txt"));
        assert_eq!(store.load().unwrap(), "");
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::new(tmp.path().join("state.txt"));
        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap(), "abc123");
    }

    #[test]
    fn load_trims_surrounding_whitespace() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");
        std::fs::write(&path, "  abc123\n").unwrap();
        let store = FileStateStore::new(path);
        assert_eq!(store.load().unwrap(), "abc123");
    }

    #[test]
    fn save_overwrites_previous_fingerprint() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");
        let store = FileStateStore::new(path.clone());
        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
