//! Operations the store has no counterpart for.
//!
//! They exist so callers get a typed `Unsupported` error instead of a
//! missing method.

use std::collections::BTreeMap;

use crate::error::FsError;
use crate::filesystem::adapter::CfsFileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub scope: String,
    pub kind: String,
    pub name: Option<String>,
    pub permission: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclStatus {
    pub owner: String,
    pub group: String,
    pub entries: Vec<AclEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XAttrSetFlag {
    Create,
    Replace,
}

/// Content checksum of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChecksum {
    pub algorithm: String,
    pub bytes: Vec<u8>,
}

/// Capacity summary of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStatus {
    pub capacity: u64,
    pub used: u64,
    pub remaining: u64,
}

fn unsupported<T>(operation: &'static str, path: &str) -> Result<T, FsError> {
    Err(FsError::Unsupported {
        operation,
        path: path.to_string(),
    })
}

impl CfsFileSystem {
    pub fn get_file_checksum(&self, path: &str, _length: u64) -> Result<FileChecksum, FsError> {
        unsupported("getFileChecksum", path)
    }

    pub fn get_acl_status(&self, path: &str) -> Result<AclStatus, FsError> {
        unsupported("getAclStatus", path)
    }

    pub fn set_acl(&self, path: &str, _entries: &[AclEntry]) -> Result<(), FsError> {
        unsupported("setAcl", path)
    }

    pub fn remove_acl_entries(&self, path: &str, _entries: &[AclEntry]) -> Result<(), FsError> {
        unsupported("removeAclEntries", path)
    }

    pub fn get_xattr(&self, path: &str, _name: &str) -> Result<Vec<u8>, FsError> {
        unsupported("getXAttr", path)
    }

    pub fn get_xattrs(&self, path: &str) -> Result<BTreeMap<String, Vec<u8>>, FsError> {
        unsupported("getXAttrs", path)
    }

    pub fn get_xattrs_named(
        &self,
        path: &str,
        _names: &[&str],
    ) -> Result<BTreeMap<String, Vec<u8>>, FsError> {
        unsupported("getXAttrs", path)
    }

    pub fn list_xattrs(&self, path: &str) -> Result<Vec<String>, FsError> {
        unsupported("listXAttrs", path)
    }

    pub fn set_xattr(
        &self,
        path: &str,
        _name: &str,
        _value: &[u8],
        _flags: &[XAttrSetFlag],
    ) -> Result<(), FsError> {
        unsupported("setXAttr", path)
    }

    pub fn remove_xattr(&self, path: &str, _name: &str) -> Result<(), FsError> {
        unsupported("removeXAttr", path)
    }

    /// Capacity reporting for the volume at `path`.
    pub fn fs_status(&self, path: &str) -> Result<FsStatus, FsError> {
        unsupported("getStatus", path)
    }
}
