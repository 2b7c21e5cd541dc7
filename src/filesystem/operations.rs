//! VFS verbs
//!
//! Each verb resolves its path, translates permissions, composes the single
//! `OpenIntent` (or other primitive call) for the store and converts the
//! result back into framework types.

use log::{debug, error, warn};
use std::sync::Arc;

use crate::error::{FsError, StoreError};
use crate::filesystem::adapter::CfsFileSystem;
use crate::filesystem::flags::{CreateFlags, CreateMode};
use crate::filesystem::streams::{InputStream, OutputStream};
use crate::navigate;
use crate::permission::{FsPermission, default_dir_mode, default_file_mode, umask};
use crate::status::{FileRecord, convert};
use crate::storage::{FileType, OpenIntent, StoreFile};

const MICROS_PER_MILLI: i64 = 1000;

impl CfsFileSystem {
    /// Status of a single entry.
    pub fn stat(&self, path: &str) -> Result<FileRecord, FsError> {
        debug!("stat: {}", path);
        self.statistics.increment_read_ops(1);
        let resolved = self.resolve(path)?;
        let info = self
            .storage
            .stat(&resolved)?
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        convert(self.storage.as_ref(), Some(&self.uri_prefix()), &resolved, &info)
    }

    /// Children of a directory, or the entry itself for anything else.
    pub fn list(&self, path: &str) -> Result<Vec<FileRecord>, FsError> {
        debug!("list: {}", path);
        let status = self.stat(path)?;
        if !status.is_dir {
            return Ok(vec![status]);
        }
        let resolved = self.resolve(path)?;
        let prefix = self.uri_prefix();
        self.storage
            .list(&resolved)?
            .iter()
            .map(|info| convert(self.storage.as_ref(), Some(&prefix), &resolved, info))
            .collect()
    }

    /// Creates `path` and any missing ancestors. The umask is applied to
    /// `permission`.
    pub fn mkdirs(&self, path: &str, permission: FsPermission) -> Result<(), FsError> {
        debug!("mkdirs: {} {:o}", path, permission.bits());
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        let mode = permission.apply_umask(umask(&self.config));
        let identity = self.session.identity();
        let created = self
            .storage
            .mkdirs(&resolved, mode.to_mode(), identity.uid, identity.gid)
            .map_err(|e| {
                error!("Failed to mkdirs {}: {}", path, e);
                FsError::from(e)
            })?;
        if !created {
            error!("Failed to mkdirs {}", path);
            return Err(FsError::MkdirFailed(resolved));
        }
        Ok(())
    }

    pub fn mkdirs_default(&self, path: &str) -> Result<(), FsError> {
        self.mkdirs(path, default_dir_mode(&self.config))
    }

    pub fn open(&self, path: &str) -> Result<InputStream, FsError> {
        debug!("open: {}", path);
        self.statistics.increment_read_ops(1);
        let resolved = self.resolve(path)?;
        let file = self
            .storage
            .open(&resolved, &OpenIntent::read(self.session.identity()))?;
        Ok(InputStream::new(file, Arc::clone(&self.statistics)))
    }

    pub fn append(&self, path: &str) -> Result<OutputStream, FsError> {
        debug!("append: {}", path);
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        let mode = default_file_mode(&self.config).to_mode();
        let file = self
            .storage
            .open(&resolved, &OpenIntent::append(mode, self.session.identity()))
            .map_err(|e| {
                error!("Failed to append {}: {}", path, e);
                FsError::from(e)
            })?;
        Ok(self.output(file))
    }

    /// Creates a file, making missing parents first.
    ///
    /// `permission` is passed to the store as given. Without `overwrite` an
    /// existing regular file yields `AlreadyExists`.
    pub fn create(
        &self,
        path: &str,
        permission: FsPermission,
        overwrite: bool,
    ) -> Result<OutputStream, FsError> {
        debug!(
            "create: {} {:o} overwrite {}",
            path,
            permission.bits(),
            overwrite
        );
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        if let Some(parent) = navigate::parent(&resolved) {
            self.mkdirs_default(parent)?;
        }

        let mode = permission.to_mode();
        let file = if overwrite {
            self.storage
                .open(&resolved, &OpenIntent::overwrite(mode, self.session.identity()))
                .map_err(FsError::from)
        } else {
            self.create_new(&resolved, mode)
        };
        file.map(|file| self.output(file)).map_err(|e| {
            error!("Failed to create {}: {}", path, e);
            e
        })
    }

    /// `create` with the configured default file permission, umask applied.
    pub fn create_default(&self, path: &str, overwrite: bool) -> Result<OutputStream, FsError> {
        let permission = default_file_mode(&self.config).apply_umask(umask(&self.config));
        self.create(path, permission, overwrite)
    }

    fn create_new(&self, resolved: &str, mode: u32) -> Result<Box<dyn StoreFile>, FsError> {
        let identity = self.session.identity();
        if self.storage.supports_exclusive_create() {
            match self
                .storage
                .open(resolved, &OpenIntent::create_exclusive(mode, identity))
            {
                Ok(file) => return Ok(file),
                Err(StoreError::AlreadyExists(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        // Without an atomic create the entry may appear between the stat and
        // the open.
        match self.storage.stat(resolved)? {
            Some(info) if info.is_regular() => Err(FsError::AlreadyExists(resolved.to_string())),
            _ => Ok(self
                .storage
                .open(resolved, &OpenIntent::create(mode, identity))?),
        }
    }

    /// Creates a file whose parent must already exist.
    pub fn create_non_recursive(
        &self,
        path: &str,
        permission: FsPermission,
        flags: CreateFlags,
    ) -> Result<OutputStream, FsError> {
        debug!(
            "create_non_recursive: {} {:o} {:?}",
            path,
            permission.bits(),
            flags
        );
        let Some(create_mode) = flags.create_mode() else {
            error!("Unsupported create flags {:?} for {}", flags, path);
            return Err(FsError::UnsupportedFlags(format!("{:?}", flags)));
        };
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        let mode = permission.to_mode();
        let identity = self.session.identity();

        let intent = match create_mode {
            CreateMode::Create => OpenIntent::create(mode, identity),
            CreateMode::CreateOrOverwrite => match self.storage.stat(&resolved)? {
                None => OpenIntent::create(mode, identity),
                Some(info) if info.is_dir() => {
                    return Err(FsError::IsADirectory(path.to_string()));
                }
                Some(_) => OpenIntent::truncate(mode, identity),
            },
        };
        let file = self.storage.open(&resolved, &intent).map_err(|e| {
            error!("Failed to create {}: {}", path, e);
            FsError::from(e)
        })?;
        Ok(self.output(file))
    }

    /// Shrinks a regular file. Returns false when there is nothing to do.
    pub fn truncate(&self, path: &str, new_length: u64) -> Result<bool, FsError> {
        debug!("truncate: {} {}", path, new_length);
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        match self.storage.stat(&resolved)? {
            None => {
                warn!("truncate: {} does not exist", path);
                Ok(false)
            }
            Some(info) if info.is_dir() || info.size <= new_length => Ok(false),
            Some(_) => {
                self.storage.truncate(&resolved, new_length).map_err(|e| {
                    error!("Failed to truncate {}: {}", path, e);
                    FsError::from(e)
                })?;
                Ok(true)
            }
        }
    }

    /// Removes an entry. Returns false when it does not exist.
    pub fn delete(&self, path: &str, recursive: bool) -> Result<bool, FsError> {
        debug!("delete: {} recursive {}", path, recursive);
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        let Some(info) = self.storage.stat(&resolved)? else {
            return Ok(false);
        };
        let result = match info.kind() {
            FileType::Directory => self.storage.rmdir(&resolved, recursive),
            FileType::Regular | FileType::Link => self.storage.unlink(&resolved),
        };
        result.map_err(|e| {
            error!("Failed to delete {}: {}", path, e);
            FsError::from(e)
        })?;
        Ok(true)
    }

    /// Moves `src` to `dst`. Store failures are logged and reported as false.
    pub fn rename(&self, src: &str, dst: &str) -> Result<bool, FsError> {
        debug!("rename: {} -> {}", src, dst);
        self.statistics.increment_write_ops(1);
        let from = self.resolve(src)?;
        let to = self.resolve(dst)?;
        let Some(src_info) = self.storage.stat(&from)? else {
            return Ok(false);
        };
        match src_info.kind() {
            FileType::Regular => {
                if let Some(dst_info) = self.storage.stat(&to)? {
                    if dst_info.is_regular() {
                        return Ok(from == to);
                    }
                }
            }
            FileType::Directory | FileType::Link => {}
        }
        match self.storage.rename(&from, &to) {
            Ok(()) => Ok(true),
            Err(e) => {
                error!("Failed to rename {} to {}: {}", src, dst, e);
                Ok(false)
            }
        }
    }

    pub fn set_permission(&self, path: &str, permission: FsPermission) -> Result<(), FsError> {
        debug!("set_permission: {} {:o}", path, permission.bits());
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        self.storage
            .chmod(&resolved, permission.to_mode())
            .map_err(|e| {
                error!("Failed to chmod {}: {}", path, e);
                FsError::from(e)
            })
    }

    /// Changes owner names. An empty name leaves that part unchanged.
    pub fn set_owner(&self, path: &str, user: &str, group: &str) -> Result<(), FsError> {
        debug!("set_owner: {} {}:{}", path, user, group);
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        self.storage.chown(&resolved, user, group).map_err(|e| {
            error!("Failed to chown {}: {}", path, e);
            FsError::from(e)
        })
    }

    /// Sets times given in milliseconds. Negative values become 0.
    pub fn set_times(&self, path: &str, mtime: i64, atime: i64) -> Result<(), FsError> {
        debug!("set_times: {} mtime {} atime {}", path, mtime, atime);
        self.statistics.increment_write_ops(1);
        let resolved = self.resolve(path)?;
        self.storage
            .set_times(&resolved, millis_to_micros(mtime), millis_to_micros(atime))
            .map_err(|e| {
                error!("Failed to set times of {}: {}", path, e);
                FsError::from(e)
            })
    }

    fn output(&self, file: Box<dyn StoreFile>) -> OutputStream {
        OutputStream::new(file, Arc::clone(&self.statistics))
    }
}

fn millis_to_micros(millis: i64) -> i64 {
    if millis < 0 {
        0
    } else {
        millis.saturating_mul(MICROS_PER_MILLI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_micros() {
        assert_eq!(millis_to_micros(-5), 0);
        assert_eq!(millis_to_micros(0), 0);
        assert_eq!(millis_to_micros(1_500), 1_500_000);
    }
}
