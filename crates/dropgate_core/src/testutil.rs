use crate::error::StorageError;
use crate::traits::{ObjectEntry, ObjectStore};

use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory object store with failure injection for exercising the
/// partial-failure paths of register/revoke.
#[derive(Clone, Default)]
pub struct MemStore {
    objects: Arc<Mutex<BTreeMap<String, Bytes>>>,
    fail_put_of: Arc<Mutex<Option<String>>>,
    fail_next_delete: Arc<AtomicBool>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: &str, data: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// Fails the next put of exactly this key, then disarms.
    pub fn fail_next_put_of(&self, key: &str) {
        *self.fail_put_of.lock().unwrap() = Some(key.to_string());
    }

    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }
}

impl ObjectStore for MemStore {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), StorageError> {
        let mut armed = self.fail_put_of.lock().unwrap();
        if armed.as_deref() == Some(key) {
            *armed = None;
            return Err(StorageError::Generic("injected put failure".to_string()));
        }
        drop(armed);
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Generic("injected delete failure".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| ObjectEntry {
                key: key.clone(),
                size: data.len() as u64,
                last_modified: Some(Utc::now()),
            })
            .collect())
    }
}
