//! Type-safe Key-Value persistence layer for the GoKit storefront.
//!
//! Plays the role of browser storage: JSON text under string keys, written
//! synchronously, with a change feed that lets one handle ("tab") learn about
//! writes made through another.
//!
//! # Example
//!
//! ```rust,ignore
//! use gokit_cache::{Cache, MemoryStore};
//!
//! let tab_a = MemoryStore::new();
//! let tab_b = tab_a.connect();
//! let mut feed = tab_b.subscribe();
//!
//! let cache = Cache::new(tab_a);
//! cache.set("cart", &items)?;
//!
//! // tab_b sees the write and re-reads
//! let event = feed.try_next();
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
#[cfg(target_arch = "wasm32")]
pub use store::SpinStore;
pub use store::{ChangeFeed, KeyValueStore, MemoryStore, Origin, StorageEvent};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, ChangeFeed, KeyValueStore, MemoryStore, StorageEvent};
}
