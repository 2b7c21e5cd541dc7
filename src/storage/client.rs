//! Store client contract
//!
//! The adapter never talks to the remote store directly; it goes through
//! these traits, which the store SDK binding (or `MemoryStorage`) implements.

use std::io::{Read, Seek, Write};
use std::sync::Arc;

use crate::error::StoreError;
use crate::storage::types::{OpenIntent, StatInfo};

/// An open store file handle.
pub trait StoreFile: Read + Write + Seek + Send {
    /// Releases the handle. Writes are durable once this returns.
    fn close(&mut self) -> std::io::Result<()> {
        self.flush()
    }
}

/// Native operation set of a mounted volume.
pub trait FileStorage: Send + Sync {
    fn open(&self, path: &str, intent: &OpenIntent) -> Result<Box<dyn StoreFile>, StoreError>;

    /// `Ok(None)` when nothing exists at `path`.
    fn stat(&self, path: &str) -> Result<Option<StatInfo>, StoreError>;

    /// Children of a directory, ordered by name.
    fn list(&self, path: &str) -> Result<Vec<StatInfo>, StoreError>;

    /// Creates `path` and any missing parents. Returns false when a component
    /// exists and is not a directory.
    fn mkdirs(&self, path: &str, mode: u32, uid: u32, gid: u32) -> Result<bool, StoreError>;

    fn rmdir(&self, path: &str, recursive: bool) -> Result<(), StoreError>;
    fn unlink(&self, path: &str) -> Result<(), StoreError>;
    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;
    fn chmod(&self, path: &str, mode: u32) -> Result<(), StoreError>;
    fn chown(&self, path: &str, user: &str, group: &str) -> Result<(), StoreError>;
    fn truncate(&self, path: &str, length: u64) -> Result<(), StoreError>;

    /// Times are in microseconds.
    fn set_times(&self, path: &str, mtime: i64, atime: i64) -> Result<(), StoreError>;

    fn uid_of(&self, user: &str) -> Result<u32, StoreError>;
    fn gid_of_user(&self, user: &str) -> Result<u32, StoreError>;
    fn user_name(&self, uid: u32) -> Result<String, StoreError>;
    fn group_name(&self, gid: u32) -> Result<String, StoreError>;

    fn replica_number(&self) -> u32;
    fn block_size(&self) -> u64;

    /// Whether `OpenFlags::EXCLUSIVE` is honored atomically.
    fn supports_exclusive_create(&self) -> bool {
        false
    }
}

/// Settings handed to the store client when mounting a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub masters: String,
    pub volume_name: String,
    pub owner: String,
    pub log_dir: Option<String>,
    pub log_level: Option<String>,
    pub follower_read: bool,
    pub libsdk_path: Option<String>,
}

/// Opens a `FileStorage` for a volume.
pub trait StorageConnector {
    fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn FileStorage>, StoreError>;
}
