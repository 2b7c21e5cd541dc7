//! File-context verbs
//!
//! The strict variants a file context expects: failures that the plain verbs
//! report as `false` become errors, and parent creation is opt-in.

use log::{debug, error};

use crate::error::{FsError, StoreError};
use crate::filesystem::adapter::CfsFileSystem;
use crate::filesystem::flags::CreateFlags;
use crate::filesystem::streams::OutputStream;
use crate::navigate;
use crate::permission::FsPermission;
use crate::status::BlockLocation;

impl CfsFileSystem {
    /// Creates one directory. Without `create_parent` the parent must
    /// already be a directory.
    pub fn mkdir(
        &self,
        path: &str,
        permission: FsPermission,
        create_parent: bool,
    ) -> Result<(), FsError> {
        debug!("mkdir: {} create_parent {}", path, create_parent);
        let resolved = self.resolve(path)?;
        if let Some(parent) = navigate::parent(&resolved) {
            if create_parent {
                self.mkdirs(parent, permission)?;
            } else {
                self.require_parent(parent)?;
            }
        }
        self.mkdirs(&resolved, permission)
    }

    /// `rename` that fails instead of returning false.
    pub fn rename_strict(&self, src: &str, dst: &str) -> Result<(), FsError> {
        if self.rename(src, dst)? {
            return Ok(());
        }
        error!("Failed to rename {} to {}", src, dst);
        Err(FsError::RenameFailed {
            src: src.to_string(),
            dst: dst.to_string(),
        })
    }

    /// `create_non_recursive`, making missing parents first when asked.
    pub fn create_internal(
        &self,
        path: &str,
        permission: FsPermission,
        flags: CreateFlags,
        create_parent: bool,
    ) -> Result<OutputStream, FsError> {
        if create_parent && flags.create_mode().is_some() {
            let resolved = self.resolve(path)?;
            if let Some(parent) = navigate::parent(&resolved) {
                self.mkdirs_default(parent)?;
            }
        }
        self.create_non_recursive(path, permission, flags)
    }

    /// One location covering `[start, min(start + len, length))`, or none
    /// when the range is empty or starts at or past the end of the file.
    pub fn file_block_locations(
        &self,
        path: &str,
        start: u64,
        len: u64,
    ) -> Result<Vec<BlockLocation>, FsError> {
        debug!("file_block_locations: {} {}+{}", path, start, len);
        let status = self.stat(path)?;
        if status.is_dir || len == 0 || start >= status.length {
            return Ok(Vec::new());
        }
        let end = start.saturating_add(len).min(status.length);
        Ok(vec![BlockLocation::local(start, end - start)])
    }

    pub fn supports_symlinks(&self) -> bool {
        true
    }

    fn require_parent(&self, parent: &str) -> Result<(), FsError> {
        match self.storage.stat(parent)? {
            Some(info) if info.is_dir() => Ok(()),
            Some(_) => Err(StoreError::NotADirectory(parent.to_string()).into()),
            None => Err(FsError::NotFound(parent.to_string())),
        }
    }
}
