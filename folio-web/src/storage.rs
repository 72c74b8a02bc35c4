use folio_client::{KeyValueStore, StorageError};
use gloo_storage::{LocalStorage, Storage};

/// The browser's local storage
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

fn js_error(e: wasm_bindgen::JsValue) -> StorageError {
    let text = format!("{e:?}");
    match text.contains("QuotaExceeded") {
        true => StorageError::QuotaExceeded,
        false => StorageError::Backend(text),
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw().get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw().set_item(key, value).map_err(js_error)
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = LocalStorage::raw().remove_item(key) {
            tracing::warn!(%key, error = ?e, "failed to remove item from local storage");
        }
    }
}
