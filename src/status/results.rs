//! Status result types

use crate::permission::FsPermission;

/// File status in the framework's vocabulary. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub length: u64,
    pub is_dir: bool,
    pub replication: u32,
    pub block_size: u64,
    pub modification_time: i64,
    pub access_time: i64,
    pub permission: FsPermission,
    pub owner: String,
    pub group: String,
    /// Fully qualified, e.g. `cfs://vol/user/alice/file`.
    pub path: String,
}

impl FileRecord {
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Last path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Advertised server defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDefaults {
    pub block_size: u64,
    pub bytes_per_checksum: u32,
    pub write_packet_size: u32,
    pub replication: u16,
    pub file_buffer_size: u32,
    pub encrypt_data_transfer: bool,
    pub trash_interval: u64,
    pub checksum_type: ChecksumType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    None,
}

impl Default for ServerDefaults {
    fn default() -> Self {
        Self {
            block_size: 64 * 1024 * 1024,
            bytes_per_checksum: 1,
            write_packet_size: 64 * 1024 * 1024,
            replication: 3,
            file_buffer_size: 64 * 1024 * 1024,
            encrypt_data_transfer: false,
            trash_interval: 3600,
            checksum_type: ChecksumType::None,
        }
    }
}

/// Hosts holding a byte range of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLocation {
    /// `host:port` transfer addresses.
    pub names: Vec<String>,
    pub hosts: Vec<String>,
    pub offset: u64,
    pub length: u64,
}

impl BlockLocation {
    /// A range served by the local host.
    pub fn local(offset: u64, length: u64) -> Self {
        Self {
            names: vec![format!("{}:{}", LOCAL_HOST, LOCAL_TRANSFER_PORT)],
            hosts: vec![LOCAL_HOST.to_string()],
            offset,
            length,
        }
    }
}

const LOCAL_HOST: &str = "localhost";
const LOCAL_TRANSFER_PORT: u16 = 9866;
