//! Browser-side collaborators: `localStorage` persistence and console notices.

use blu_core::{NoticeLevel, Notifier, Store, StoreError};
use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `localStorage`-backed store. Keys are `<namespace>.<key>`, values JSON text.
///
/// Storage can be missing (sandboxed frames, disabled cookies); every call
/// then reports `Unavailable` and the engine keeps running on defaults.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn from_window() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage is not available".to_string()))
    }
}

fn js_error(e: JsValue) -> StoreError {
    StoreError::Unavailable(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

impl Store for LocalStorageStore {
    fn load(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let raw = self
            .storage()?
            .get_item(&format!("{namespace}.{key}"))
            .map_err(js_error)?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(value)?;
        self.storage()?
            .set_item(&format!("{namespace}.{key}"), &text)
            .map_err(js_error)
    }
}

/// Writes notices to the browser console.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, level: NoticeLevel) {
        let line = JsValue::from_str(&format!("[BluBlock] {message}"));
        match level {
            NoticeLevel::Info | NoticeLevel::Success => web_sys::console::info_1(&line),
            NoticeLevel::Warning => web_sys::console::warn_1(&line),
            NoticeLevel::Error => web_sys::console::error_1(&line),
        }
    }
}
