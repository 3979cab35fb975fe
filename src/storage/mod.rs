//! Local key/value persistence
//!
//! Every component that needs durable local state goes through the
//! `KeyValueStore` trait. Routine reads and writes never fail from the
//! caller's point of view: storage trouble (missing file, bad
//! permissions, disk full) degrades to empty reads and dropped writes
//! with a warning. Callers that must observe write failures (settings
//! import) use `try_set` directly.

pub mod keys;

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write store file: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to serialize store contents: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Flat string key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. Absent keys and storage failures both read as `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a key, surfacing storage failures to the caller.
    fn try_set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Failures are swallowed.
    fn remove(&self, key: &str);

    /// All keys currently present, in unspecified order.
    fn keys(&self) -> Vec<String>;

    /// Write a key, swallowing storage failures.
    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            warn!("storage write for {} failed: {}", key, e);
        }
    }
}
