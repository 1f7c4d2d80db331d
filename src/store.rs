use crate::logging;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable storage for a session's history entries.
///
/// Loads and saves are whole-list operations; there is no incremental
/// append. A missing session loads as an empty list.
pub trait HistoryStore: Send {
    fn load(&self, name: &str) -> Result<Vec<String>>;
    fn save(&self, name: &str, entries: &[String]) -> Result<()>;
}

/// One `<dir>/<name>-history.json` file per session, holding a JSON array
/// of strings. Unparseable content is treated as empty history with a
/// diagnostic, so a corrupted file never makes the prompt unusable.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}-history.json"))
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self, name: &str) -> Result<Vec<String>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading history file {}", path.display()))?;
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(parse_error) => {
                logging::emit_history_parse_error(&path, &parse_error);
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, name: &str, entries: &[String]) -> Result<()> {
        let path = self.path_for(name);
        let body = serde_json::to_string(entries).context("serializing history entries")?;
        fs::write(&path, body)
            .with_context(|| format!("writing history file {}", path.display()))
    }
}

/// In-memory store for tests and sessions with persistence disabled.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(entries.get(name).cloned().unwrap_or_default())
    }

    fn save(&self, name: &str, entries: &[String]) -> Result<()> {
        let mut map = self.entries.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        map.insert(name.to_string(), entries.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        let entries = vec!["ls".to_string(), "pwd".to_string()];
        store.save("default", &entries).expect("save");
        assert_eq!(store.load("default").expect("load"), entries);
    }

    #[test]
    fn test_missing_file_loads_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        assert!(store.load("never-saved").expect("load").is_empty());
    }

    #[test]
    fn test_malformed_file_recovers_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path_for("default"), "{not json]").expect("write");
        assert!(store.load("default").expect("load").is_empty());
    }

    #[test]
    fn test_file_store_path_uses_session_name() {
        let store = JsonFileStore::new("/tmp");
        assert_eq!(
            store.path_for("files"),
            PathBuf::from("/tmp/files-history.json")
        );
    }

    #[test]
    fn test_save_overwrites_whole_list() {
        let store = MemoryStore::new();
        store.save("s", &["a".to_string(), "b".to_string()]).expect("save");
        store.save("s", &["c".to_string()]).expect("save");
        assert_eq!(store.load("s").expect("load"), vec!["c".to_string()]);
    }
}
