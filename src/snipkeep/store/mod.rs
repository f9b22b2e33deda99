//! # Storage Layer
//!
//! Persistence is a single serialized blob kept under a fixed key in a
//! key-value byte store. The [`KeyValueStore`] trait is that store; it knows
//! nothing about folders or snippets (see `persist.rs` for the format).
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage
//!   - Each key is a file `{key}.json` inside the data directory
//!   - Writes go to a temp file first and are renamed into place
//!
//! - [`memory::MemoryStore`]: In-memory storage for testing
//!   - No persistence
//!   - Can simulate write failures (e.g. a full disk or exceeded quota)

use crate::error::Result;

pub mod fs;
pub mod memory;

/// Abstract interface for raw key-value byte I/O.
pub trait KeyValueStore {
    /// Read the bytes stored under `key`.
    /// Returns Ok(None) if nothing was ever written there.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the bytes stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}
