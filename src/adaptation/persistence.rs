// ModelStore - boundary to the external key-value store holding models
//
// The adaptation store only ever talks to this trait. Two implementations
// ship with the crate: one JSON file per user in a directory, and an
// in-process map used by tests and the engine when nothing is configured.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adaptation::model::PersonalModel;
use crate::error::PersistenceError;

/// Loads and saves personal models by user key
pub trait ModelStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored for `user` yet
    fn load(&self, user: &str) -> Result<Option<PersonalModel>, PersistenceError>;

    fn save(&self, user: &str, model: &PersonalModel) -> Result<(), PersistenceError>;
}

fn encode(model: &PersonalModel) -> Result<String, PersistenceError> {
    serde_json::to_string_pretty(model).map_err(|e| PersistenceError::Serialization {
        reason: e.to_string(),
    })
}

fn decode(json: &str) -> Result<PersonalModel, PersistenceError> {
    serde_json::from_str(json).map_err(|e| PersistenceError::Deserialization {
        reason: e.to_string(),
    })
}

/// One `<user>.json` file per user inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File backing `user`; characters outside `[A-Za-z0-9_-]` become `_`
    pub fn path_for(&self, user: &str) -> PathBuf {
        let key: String = user
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let key = if key.is_empty() { "default".to_string() } else { key };
        self.dir.join(format!("{}.json", key))
    }
}

impl ModelStore for JsonFileStore {
    fn load(&self, user: &str) -> Result<Option<PersonalModel>, PersistenceError> {
        let path = self.path_for(user);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        decode(&contents).map(Some)
    }

    fn save(&self, user: &str, model: &PersonalModel) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(user);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encode(model)?)?;
        fs::rename(&tmp, &path)?;
        log::debug!("[ModelStore] Saved personal model to {:?}", path);
        Ok(())
    }
}

/// In-process store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    models: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a stored model
    pub fn len(&self) -> usize {
        self.models.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModelStore for MemoryStore {
    fn load(&self, user: &str) -> Result<Option<PersonalModel>, PersistenceError> {
        let models = self
            .models
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)?;
        models.get(user).map(|json| decode(json)).transpose()
    }

    fn save(&self, user: &str, model: &PersonalModel) -> Result<(), PersistenceError> {
        let json = encode(model)?;
        let mut models = self
            .models
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)?;
        models.insert(user.to_string(), json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("emotion_store_{}_{}", tag, std::process::id()))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.load("alice").unwrap(), None);

        let model = PersonalModel::new(0.3);
        store.save("alice", &model).unwrap();
        assert_eq!(store.load("alice").unwrap(), Some(model));
        assert_eq!(store.len(), 1);

        // Clones share state
        let clone = store.clone();
        assert!(clone.load("alice").unwrap().is_some());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = temp_dir("roundtrip");
        let store = JsonFileStore::new(&dir);
        assert_eq!(store.load("bob").unwrap(), None);

        let model = PersonalModel::new(0.2);
        store.save("bob", &model).unwrap();
        assert!(store.path_for("bob").exists());
        assert_eq!(store.load("bob").unwrap(), Some(model));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = temp_dir("garbage");
        fs::create_dir_all(&dir).unwrap();
        let store = JsonFileStore::new(&dir);
        fs::write(store.path_for("carol"), "not json").unwrap();

        let err = store.load("carol").unwrap_err();
        assert!(matches!(err, PersistenceError::Deserialization { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_path_sanitized() {
        let store = JsonFileStore::new("/tmp/models");
        assert_eq!(
            store.path_for("../evil user"),
            PathBuf::from("/tmp/models/___evil_user.json")
        );
        assert_eq!(store.path_for(""), PathBuf::from("/tmp/models/default.json"));
    }
}
