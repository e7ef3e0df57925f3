//! Key-value stores backing the resolver's caches
//!
//! - `MemoryStore`: session-lived, in-process
//! - `PinStore`: persistent, SQLite-backed user overrides

mod memory;
mod pins;

use anyhow::Result;

pub use memory::MemoryStore;
pub use pins::PinStore;

/// Minimal string key-value capability injected into the resolver
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
