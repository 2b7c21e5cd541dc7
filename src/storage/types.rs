//! Store-side value types
//!
//! Raw stat records, the closed set of file types the store reports, and the
//! flag/intent values passed to the store's open primitive.

use bitflags::bitflags;

use crate::error::StoreError;

/// File type as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Link,
}

impl FileType {
    const S_IFMT: u32 = 0o170000;
    const S_IFREG: u32 = 0o100000;
    const S_IFDIR: u32 = 0o040000;
    const S_IFLNK: u32 = 0o120000;

    /// Decodes the type bits of a raw store mode word.
    ///
    /// Anything other than a regular file, directory or symlink is rejected
    /// instead of being folded into one of the known kinds.
    pub fn from_mode(mode: u32) -> Result<Self, StoreError> {
        match mode & Self::S_IFMT {
            Self::S_IFREG => Ok(FileType::Regular),
            Self::S_IFDIR => Ok(FileType::Directory),
            Self::S_IFLNK => Ok(FileType::Link),
            other => Err(StoreError::UnknownType(other)),
        }
    }

    pub fn type_bits(&self) -> u32 {
        match self {
            FileType::Regular => Self::S_IFREG,
            FileType::Directory => Self::S_IFDIR,
            FileType::Link => Self::S_IFLNK,
        }
    }
}

/// Raw stat record returned by the store.
///
/// Times are in seconds. `name` is `None` when the record describes the
/// stat'ed path itself and holds the child name for listing entries. The
/// kind and the mode word are set together by the constructors, so the type
/// bits of `mode()` always agree with `kind()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatInfo {
    kind: FileType,
    mode: u32,
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub mtime: i64,
    pub atime: i64,
    pub name: Option<String>,
}

impl StatInfo {
    pub fn new(
        kind: FileType,
        permission: u32,
        size: u64,
        owner: Identity,
        mtime: i64,
        atime: i64,
    ) -> Self {
        Self {
            kind,
            mode: kind.type_bits() | (permission & 0o7777),
            size,
            uid: owner.uid,
            gid: owner.gid,
            mtime,
            atime,
            name: None,
        }
    }

    /// Builds a record from a raw mode word, rejecting unknown type bits.
    pub fn from_mode(
        mode: u32,
        size: u64,
        owner: Identity,
        mtime: i64,
        atime: i64,
    ) -> Result<Self, StoreError> {
        let kind = FileType::from_mode(mode)?;
        Ok(Self::new(kind, mode, size, owner, mtime, atime))
    }

    pub fn kind(&self) -> FileType {
        self.kind
    }

    /// Full mode word, type bits included.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileType::Directory
    }

    pub fn is_regular(&self) -> bool {
        self.kind == FileType::Regular
    }

    /// Permission bits without the type bits.
    pub fn permission_bits(&self) -> u16 {
        (self.mode & 0o7777) as u16
    }
}

bitflags! {
    /// Flags understood by `FileStorage::open`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const CREATE = 1 << 2;
        /// Create-if-absent: together with `CREATE`, fail when the entry exists.
        const EXCLUSIVE = 1 << 3;
        const TRUNCATE = 1 << 4;
        const APPEND = 1 << 5;
    }
}

/// Numeric identity the store attributes new entries to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

/// The single value handed to the store's open primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenIntent {
    pub flags: OpenFlags,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl OpenIntent {
    pub fn new(flags: OpenFlags, mode: u32, identity: Identity) -> Self {
        Self {
            flags,
            mode,
            uid: identity.uid,
            gid: identity.gid,
        }
    }

    /// Read-only open; the mode is irrelevant.
    pub fn read(identity: Identity) -> Self {
        Self::new(OpenFlags::READ, 0, identity)
    }

    pub fn append(mode: u32, identity: Identity) -> Self {
        Self::new(OpenFlags::WRITE | OpenFlags::APPEND, mode, identity)
    }

    /// Create the entry, or open it as-is if it already exists.
    pub fn create(mode: u32, identity: Identity) -> Self {
        Self::new(OpenFlags::WRITE | OpenFlags::CREATE, mode, identity)
    }

    /// Create the entry, failing if it already exists.
    pub fn create_exclusive(mode: u32, identity: Identity) -> Self {
        Self::new(
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::EXCLUSIVE,
            mode,
            identity,
        )
    }

    /// Open an existing entry and drop its contents.
    pub fn truncate(mode: u32, identity: Identity) -> Self {
        Self::new(OpenFlags::WRITE | OpenFlags::TRUNCATE, mode, identity)
    }

    /// Create the entry if absent, otherwise drop its contents.
    pub fn overwrite(mode: u32, identity: Identity) -> Self {
        Self::new(
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
            mode,
            identity,
        )
    }

    pub fn is_write(&self) -> bool {
        self.flags.contains(OpenFlags::WRITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: Identity = Identity { uid: 1000, gid: 100 };

    #[test]
    fn test_file_type_from_mode() {
        assert_eq!(FileType::from_mode(0o100644).unwrap(), FileType::Regular);
        assert_eq!(FileType::from_mode(0o040755).unwrap(), FileType::Directory);
        assert_eq!(FileType::from_mode(0o120777).unwrap(), FileType::Link);
    }

    #[test]
    fn test_unknown_type_fails_loudly() {
        // FIFO
        let err = FileType::from_mode(0o010644).unwrap_err();
        assert!(matches!(err, StoreError::UnknownType(0o010000)));
    }

    #[test]
    fn test_stat_kind_follows_mode() {
        let info = StatInfo::from_mode(0o040750, 0, ID, 10, 10).unwrap();
        assert!(info.is_dir());
        assert_eq!(info.permission_bits(), 0o750);

        let info = StatInfo::new(FileType::Link, 0o120777, 3, ID, 0, 0);
        assert_eq!(info.kind(), FileType::Link);
        assert_eq!(info.mode(), 0o120777);
        assert_eq!(info.name, None);
    }

    #[test]
    fn test_stat_from_unknown_mode_fails() {
        let err = StatInfo::from_mode(0o060600, 0, ID, 0, 0).unwrap_err();
        assert!(matches!(err, StoreError::UnknownType(0o060000)));
    }

    #[test]
    fn test_intent_shapes() {
        assert_eq!(OpenIntent::read(ID).flags, OpenFlags::READ);
        assert_eq!(
            OpenIntent::append(0o644, ID).flags,
            OpenFlags::WRITE | OpenFlags::APPEND
        );
        assert!(OpenIntent::create_exclusive(0o644, ID)
            .flags
            .contains(OpenFlags::EXCLUSIVE));
        assert!(!OpenIntent::truncate(0o644, ID)
            .flags
            .contains(OpenFlags::CREATE));
    }

    #[test]
    fn test_intent_carries_identity() {
        let intent = OpenIntent::create(0o600, ID);
        assert_eq!((intent.uid, intent.gid, intent.mode), (1000, 100, 0o600));
    }
}
