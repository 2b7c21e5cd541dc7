//! Store contract
//!
//! Outbound interface to the remote store, its value types, and an
//! in-process implementation.

pub mod client;
pub mod memory;
pub mod types;

pub use client::{FileStorage, StorageConfig, StorageConnector, StoreFile};
pub use memory::{MemoryConnector, MemoryStorage};
pub use types::{FileType, Identity, OpenFlags, OpenIntent, StatInfo};
