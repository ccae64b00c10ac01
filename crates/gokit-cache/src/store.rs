//! Raw key-value backends and the cross-handle change feed.

use crate::CacheError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Capacity of the change-notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Identifies one handle onto a shared store (one browser tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin(u64);

/// A change made to a key by some handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: String,
    /// New raw value, `None` when the key was removed.
    pub new_value: Option<String>,
    /// Handle that performed the write.
    pub origin: Origin,
}

/// Backend holding JSON text under string keys.
///
/// Writes are synchronous. There is no locking or versioning: the last
/// writer wins.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a raw value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// Subscribe to changes made through other handles.
    fn subscribe(&self) -> ChangeFeed;
}

/// Receives [`StorageEvent`]s written by other handles.
///
/// Events from the subscribing handle itself are skipped, the way a browser
/// only fires `storage` events in other tabs. Delivery is eventual; when the
/// feed falls behind, missed events are dropped and listeners are expected to
/// re-read the store.
pub struct ChangeFeed {
    receiver: broadcast::Receiver<StorageEvent>,
    origin: Origin,
}

impl ChangeFeed {
    fn new(receiver: broadcast::Receiver<StorageEvent>, origin: Origin) -> Self {
        Self { receiver, origin }
    }

    /// Wait for the next foreign change. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage change feed lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending foreign change without waiting.
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage change feed lagged");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

struct Shared {
    entries: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
    next_origin: AtomicU64,
}

/// In-process store shared between handles.
///
/// Cloning a handle keeps its origin; [`MemoryStore::connect`] opens a new
/// handle with its own origin onto the same entries, which is how tests and
/// hosts model several tabs over one storage area.
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    origin: Origin,
}

impl MemoryStore {
    /// Create an empty store and its first handle.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            entries: RwLock::new(HashMap::new()),
            events,
            next_origin: AtomicU64::new(1),
        });
        Self {
            shared,
            origin: Origin(0),
        }
    }

    /// Open another handle onto the same entries.
    pub fn connect(&self) -> Self {
        let id = self.shared.next_origin.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: Arc::clone(&self.shared),
            origin: Origin(id),
        }
    }

    /// Origin of this handle.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Keys currently stored.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = self
            .shared
            .entries
            .read()
            .map_err(|e| CacheError::StoreError(e.to_string()))?;
        Ok(entries.keys().cloned().collect())
    }

    fn publish(&self, key: &str, new_value: Option<String>) {
        // No subscribers is fine.
        let _ = self.shared.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            origin: self.origin,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self
            .shared
            .entries
            .read()
            .map_err(|e| CacheError::StoreError(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let previous = {
            let mut entries = self
                .shared
                .entries
                .write()
                .map_err(|e| CacheError::StoreError(e.to_string()))?;
            entries.insert(key.to_string(), value.to_string())
        };
        if previous.as_deref() != Some(value) {
            self.publish(key, Some(value.to_string()));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let previous = {
            let mut entries = self
                .shared
                .entries
                .write()
                .map_err(|e| CacheError::StoreError(e.to_string()))?;
            entries.remove(key)
        };
        if previous.is_some() {
            self.publish(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> ChangeFeed {
        ChangeFeed::new(self.shared.events.subscribe(), self.origin)
    }
}

/// Store backed by Spin's Key-Value Store.
///
/// Spin does not report writes from other instances, so the change feed of
/// this backend never yields.
#[cfg(target_arch = "wasm32")]
pub struct SpinStore {
    store: spin_sdk::key_value::Store,
    events: broadcast::Sender<StorageEvent>,
}

#[cfg(target_arch = "wasm32")]
impl SpinStore {
    /// Open the default Key-Value store.
    pub fn open_default() -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open_default()
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self::from_store(store))
    }

    /// Open a named Key-Value store.
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open(name)
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self::from_store(store))
    }

    fn from_store(store: spin_sdk::key_value::Store) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, events }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for SpinStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.store.get(key) {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| CacheError::Corrupt(key.to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(CacheError::StoreError(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.store
            .set(key, value.as_bytes())
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store
            .exists(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn subscribe(&self) -> ChangeFeed {
        ChangeFeed::new(self.events.subscribe(), Origin(0))
    }
}
