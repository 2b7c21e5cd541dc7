//! Raw stat record conversion

use crate::error::FsError;
use crate::navigate::{join_child, qualify};
use crate::permission::{FsPermission, owner_names};
use crate::status::results::FileRecord;
use crate::storage::{FileStorage, StatInfo};

const MILLIS_PER_SECOND: i64 = 1000;

/// Converts a record straight from the store (times in seconds).
///
/// The path is `uri_prefix + parent` when the record carries no name, and
/// `uri_prefix + parent + "/" + name` otherwise.
pub fn convert(
    storage: &dyn FileStorage,
    uri_prefix: Option<&str>,
    parent: &str,
    info: &StatInfo,
) -> Result<FileRecord, FsError> {
    let path = match info.name.as_deref() {
        None | Some("") => qualify(uri_prefix, parent),
        Some(name) => qualify(uri_prefix, &join_child(parent, name)),
    };
    build(
        storage,
        info,
        path,
        info.mtime.saturating_mul(MILLIS_PER_SECOND),
        info.atime.saturating_mul(MILLIS_PER_SECOND),
    )
}

/// Converts a record whose times are already in milliseconds, at a path that
/// is already qualified. No scaling is applied.
pub fn convert_at(
    storage: &dyn FileStorage,
    qualified_path: &str,
    info: &StatInfo,
) -> Result<FileRecord, FsError> {
    build(storage, info, qualified_path.to_string(), info.mtime, info.atime)
}

fn build(
    storage: &dyn FileStorage,
    info: &StatInfo,
    path: String,
    modification_time: i64,
    access_time: i64,
) -> Result<FileRecord, FsError> {
    let (owner, group) = owner_names(storage, info.uid, info.gid)?;
    Ok(FileRecord {
        length: info.size,
        is_dir: info.is_dir(),
        replication: storage.replica_number(),
        block_size: storage.block_size(),
        modification_time,
        access_time,
        permission: FsPermission::new(info.permission_bits()),
        owner,
        group,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Identity, MemoryStorage};

    fn info(name: Option<&str>) -> StatInfo {
        let owner = Identity { uid: 1001, gid: 50 };
        let mut info =
            StatInfo::from_mode(0o100640, 42, owner, 1_600_000_000, 1_600_000_100).unwrap();
        info.name = name.map(str::to_string);
        info
    }

    fn store() -> MemoryStorage {
        let store = MemoryStorage::new();
        store.add_user("alice", 1001, "staff", 50);
        store
    }

    #[test]
    fn test_convert_named_entry() {
        let record = convert(&store(), Some("cfs://vol"), "/data", &info(Some("f"))).unwrap();
        assert_eq!(record.path, "cfs://vol/data/f");
        assert_eq!(record.length, 42);
        assert!(!record.is_dir);
        assert_eq!(record.permission.bits(), 0o640);
        assert_eq!((record.owner.as_str(), record.group.as_str()), ("alice", "staff"));
        assert_eq!(record.replication, 3);
    }

    #[test]
    fn test_convert_unnamed_uses_parent() {
        let record = convert(&store(), Some("cfs://vol"), "/data/f", &info(None)).unwrap();
        assert_eq!(record.path, "cfs://vol/data/f");
        let record = convert(&store(), None, "/data/f", &info(Some(""))).unwrap();
        assert_eq!(record.path, "/data/f");
    }

    #[test]
    fn test_convert_root_child_has_single_slash() {
        let record = convert(&store(), Some("cfs://vol"), "/", &info(Some("top"))).unwrap();
        assert_eq!(record.path, "cfs://vol/top");
    }

    #[test]
    fn test_convert_scales_seconds_to_millis() {
        let raw = info(None);
        let record = convert(&store(), None, "/f", &raw).unwrap();
        assert_eq!(record.modification_time, 1_600_000_000_000);
        assert_eq!(record.modification_time / 1000, raw.mtime);
        assert_eq!(record.access_time / 1000, raw.atime);
    }

    #[test]
    fn test_convert_saturates_extreme_times() {
        let mut raw = info(None);
        raw.mtime = i64::MAX;
        raw.atime = i64::MIN;
        let record = convert(&store(), None, "/f", &raw).unwrap();
        assert_eq!(record.modification_time, i64::MAX);
        assert_eq!(record.access_time, i64::MIN);
    }

    #[test]
    fn test_convert_at_does_not_rescale() {
        let mut raw = info(None);
        raw.mtime = 1_600_000_000_123;
        let record = convert_at(&store(), "cfs://vol/f", &raw).unwrap();
        assert_eq!(record.modification_time, 1_600_000_000_123);
        assert_eq!(record.path, "cfs://vol/f");
    }
}
