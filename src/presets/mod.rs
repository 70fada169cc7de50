//! Preset persistence module
//!
//! Presets are named queue templates kept in a durable key-value record.

pub mod error;
pub mod kv;
pub mod store;

// Re-export main types
pub use error::StoreError;
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use store::{Preset, PresetStore, STORAGE_KEY};
