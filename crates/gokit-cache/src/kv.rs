//! Typed wrapper over a [`KeyValueStore`] with automatic serialization.

use crate::store::{ChangeFeed, KeyValueStore};
use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Type-safe cache over any [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
pub struct Cache<S> {
    store: S,
}

impl<S: KeyValueStore> Cache<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let used: Option<HashMap<String, u32>> = cache.get("usedCodes")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Get a value, treating JSON `null` the same as a missing key.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, CacheError> {
        Ok(self.get::<Option<T>>(key)?.flatten().unwrap_or_default())
    }

    /// Set a value in the cache.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// cache.set("cart", &items)?;
    /// ```
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let text = serde_json::to_string(value)?;
        self.store.set(key, &text)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Subscribe to changes written through other handles of the store.
    pub fn subscribe(&self) -> ChangeFeed {
        self.store.subscribe()
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
