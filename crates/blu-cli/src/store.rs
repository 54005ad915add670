//! JSON file store: `<root>/<namespace>/<key>.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use blu_core::{Store, StoreError};
use serde_json::Value;

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join(namespace).join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(namespace, key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(namespace, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // replace atomically
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blu_core::{Engine, Preset};
    use serde_json::json;

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("BluBlock", "prefs").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("BluBlock", "stats", &json!({"blocked": 3})).unwrap();
        assert!(dir.path().join("BluBlock").join("stats.json").exists());
        assert_eq!(store.load("BluBlock", "stats").unwrap(), Some(json!({"blocked": 3})));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ns = dir.path().join("BluBlock");
        fs::create_dir_all(&ns).unwrap();
        fs::write(ns.join("prefs.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.load("BluBlock", "prefs"), Err(StoreError::Serialize(_))));
    }

    #[test]
    fn test_engine_state_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut engine = Engine::builder(FileStore::new(dir.path())).seed(9).build();
            engine.apply_preset("titanium").unwrap();
            engine.intercept(Some("https://x.com/embed/abc"));
        }
        let engine = Engine::builder(FileStore::new(dir.path())).build();
        assert_eq!(engine.mode(), Preset::Titanium);
        assert_eq!(engine.stats().blocked, 1);
        assert_eq!(engine.activity().len(), 1);
    }
}
