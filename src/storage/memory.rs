//! In-process store
//!
//! `MemoryStorage` implements the full `FileStorage` contract over a
//! path-keyed namespace held in memory. It backs the adapter tests and the
//! local mode of the shell.

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::error::StoreError;
use crate::storage::client::{FileStorage, StorageConfig, StorageConnector, StoreFile};
use crate::storage::types::{FileType, Identity, OpenFlags, OpenIntent, StatInfo};

const DEFAULT_REPLICAS: u32 = 3;
const DEFAULT_BLOCK_SIZE: u64 = 64 * 1024 * 1024;

struct Node {
    kind: FileType,
    mode: u32,
    uid: u32,
    gid: u32,
    mtime_us: i64,
    atime_us: i64,
    data: Vec<u8>,
}

impl Node {
    fn new(kind: FileType, mode: u32, uid: u32, gid: u32) -> Self {
        let now = now_micros();
        Self {
            kind,
            mode: mode & 0o7777,
            uid,
            gid,
            mtime_us: now,
            atime_us: now,
            data: Vec::new(),
        }
    }

    fn stat(&self, name: Option<String>) -> StatInfo {
        let owner = Identity {
            uid: self.uid,
            gid: self.gid,
        };
        let mut info = StatInfo::new(
            self.kind,
            self.mode,
            self.data.len() as u64,
            owner,
            self.mtime_us / 1_000_000,
            self.atime_us / 1_000_000,
        );
        info.name = name;
        info
    }
}

#[derive(Default)]
struct Namespace {
    nodes: BTreeMap<String, Node>,
    users: BTreeMap<String, (u32, u32)>,
    groups: BTreeMap<String, u32>,
}

impl Namespace {
    fn node(&self, path: &str) -> Result<&Node, StoreError> {
        self.nodes
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut Node, StoreError> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn require_dir(&self, path: &str) -> Result<(), StoreError> {
        match self.node(path)?.kind {
            FileType::Directory => Ok(()),
            _ => Err(StoreError::NotADirectory(path.to_string())),
        }
    }

    /// Paths strictly below `path`, in name order.
    fn descendants(&self, path: &str) -> Vec<String> {
        let prefix = child_prefix(path);
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn children(&self, path: &str) -> Vec<(String, &Node)> {
        let prefix = child_prefix(path);
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('/'))
            .map(|(key, node)| (key[prefix.len()..].to_string(), node))
            .collect()
    }
}

fn child_prefix(path: &str) -> String {
    if path == "/" {
        "/".to_string()
    } else {
        format!("{}/", path)
    }
}

fn parent_of(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(n) => Some(&path[..n]),
        None => None,
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or_default()
}

/// In-memory volume. Clones share the same namespace.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Namespace>>,
    replicas: u32,
    block_size: u64,
    exclusive_create: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Creates an empty volume with a root directory and the `root` user.
    pub fn new() -> Self {
        let mut ns = Namespace::default();
        ns.nodes
            .insert("/".to_string(), Node::new(FileType::Directory, 0o755, 0, 0));
        ns.users.insert("root".to_string(), (0, 0));
        ns.groups.insert("root".to_string(), 0);
        Self {
            inner: Arc::new(Mutex::new(ns)),
            replicas: DEFAULT_REPLICAS,
            block_size: DEFAULT_BLOCK_SIZE,
            exclusive_create: true,
        }
    }

    /// Registers a user with its primary group.
    pub fn add_user(&self, name: &str, uid: u32, group: &str, gid: u32) {
        let mut ns = self.lock();
        ns.users.insert(name.to_string(), (uid, gid));
        ns.groups.entry(group.to_string()).or_insert(gid);
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.lock().users.contains_key(name)
    }

    /// Toggles atomic create-if-absent support, to exercise the fallback path.
    pub fn set_exclusive_create(&mut self, enabled: bool) {
        self.exclusive_create = enabled;
    }

    /// Inserts a symbolic link at `path` pointing at `target`. The target is
    /// kept as the link's data and never followed.
    pub fn symlink(&self, path: &str, target: &str, uid: u32, gid: u32) -> Result<(), StoreError> {
        let mut ns = self.lock();
        if ns.nodes.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        let parent = parent_of(path).ok_or_else(|| StoreError::AlreadyExists(path.into()))?;
        ns.require_dir(parent)?;
        let mut node = Node::new(FileType::Link, 0o777, uid, gid);
        node.data = target.as_bytes().to_vec();
        ns.nodes.insert(path.to_string(), node);
        Ok(())
    }

    /// Contents of a regular file.
    pub fn read_all(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        Ok(self.lock().node(path)?.data.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Namespace> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileStorage for MemoryStorage {
    fn open(&self, path: &str, intent: &OpenIntent) -> Result<Box<dyn StoreFile>, StoreError> {
        let mut ns = self.lock();
        let flags = intent.flags;
        match ns.nodes.get_mut(path) {
            Some(node) => {
                if node.kind == FileType::Directory {
                    return Err(StoreError::IsADirectory(path.to_string()));
                }
                if flags.contains(OpenFlags::CREATE | OpenFlags::EXCLUSIVE) {
                    return Err(StoreError::AlreadyExists(path.to_string()));
                }
                if flags.contains(OpenFlags::TRUNCATE) && intent.is_write() {
                    node.data.clear();
                    node.mtime_us = now_micros();
                }
            }
            None => {
                if !flags.contains(OpenFlags::CREATE) {
                    return Err(StoreError::NotFound(path.to_string()));
                }
                let parent = parent_of(path).ok_or_else(|| StoreError::IsADirectory(path.into()))?;
                ns.require_dir(parent)?;
                debug!("memory store: create {} mode {:o}", path, intent.mode);
                ns.nodes.insert(
                    path.to_string(),
                    Node::new(FileType::Regular, intent.mode, intent.uid, intent.gid),
                );
            }
        }
        Ok(Box::new(MemoryFile {
            inner: Arc::clone(&self.inner),
            path: path.to_string(),
            flags,
            pos: 0,
        }))
    }

    fn stat(&self, path: &str) -> Result<Option<StatInfo>, StoreError> {
        Ok(self.lock().nodes.get(path).map(|node| node.stat(None)))
    }

    fn list(&self, path: &str) -> Result<Vec<StatInfo>, StoreError> {
        let ns = self.lock();
        ns.require_dir(path)?;
        Ok(ns
            .children(path)
            .into_iter()
            .map(|(name, node)| node.stat(Some(name)))
            .collect())
    }

    fn mkdirs(&self, path: &str, mode: u32, uid: u32, gid: u32) -> Result<bool, StoreError> {
        let mut ns = self.lock();
        let mut current = String::new();
        for part in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(part);
            match ns.nodes.get(&current) {
                Some(node) if node.kind == FileType::Directory => continue,
                Some(_) => return Ok(false),
                None => {
                    ns.nodes
                        .insert(current.clone(), Node::new(FileType::Directory, mode, uid, gid));
                }
            }
        }
        Ok(true)
    }

    fn rmdir(&self, path: &str, recursive: bool) -> Result<(), StoreError> {
        let mut ns = self.lock();
        ns.require_dir(path)?;
        if path == "/" {
            return Err(StoreError::Remote("cannot remove the volume root".into()));
        }
        let below = ns.descendants(path);
        if !below.is_empty() && !recursive {
            return Err(StoreError::NotEmpty(path.to_string()));
        }
        for key in below {
            ns.nodes.remove(&key);
        }
        ns.nodes.remove(path);
        Ok(())
    }

    fn unlink(&self, path: &str) -> Result<(), StoreError> {
        let mut ns = self.lock();
        if ns.node(path)?.kind == FileType::Directory {
            return Err(StoreError::IsADirectory(path.to_string()));
        }
        ns.nodes.remove(path);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let mut ns = self.lock();
        let src_kind = ns.node(from)?.kind;
        if from == to {
            return Ok(());
        }
        if from == "/" || to.starts_with(&child_prefix(from)) {
            return Err(StoreError::Remote(format!("cannot move {} under itself", from)));
        }
        let target = match ns.nodes.get(to) {
            Some(node) if node.kind == FileType::Directory => {
                format!("{}{}", child_prefix(to), name_of(from))
            }
            Some(_) => return Err(StoreError::AlreadyExists(to.to_string())),
            None => to.to_string(),
        };
        if ns.nodes.contains_key(&target) {
            return Err(StoreError::AlreadyExists(target));
        }
        let parent = parent_of(&target).ok_or_else(|| StoreError::AlreadyExists(target.clone()))?;
        ns.require_dir(parent)?;

        let mut moved = vec![from.to_string()];
        if src_kind == FileType::Directory {
            moved.extend(ns.descendants(from));
        }
        for key in moved {
            if let Some(node) = ns.nodes.remove(&key) {
                let new_key = format!("{}{}", target, &key[from.len()..]);
                ns.nodes.insert(new_key, node);
            }
        }
        Ok(())
    }

    fn chmod(&self, path: &str, mode: u32) -> Result<(), StoreError> {
        self.lock().node_mut(path)?.mode = mode & 0o7777;
        Ok(())
    }

    fn chown(&self, path: &str, user: &str, group: &str) -> Result<(), StoreError> {
        let mut ns = self.lock();
        let uid = match user {
            "" => None,
            name => Some(
                ns.users
                    .get(name)
                    .map(|(uid, _)| *uid)
                    .ok_or_else(|| StoreError::UnknownUser(name.to_string()))?,
            ),
        };
        let gid = match group {
            "" => None,
            name => Some(
                *ns.groups
                    .get(name)
                    .ok_or_else(|| StoreError::UnknownGroup(name.to_string()))?,
            ),
        };
        let node = ns.node_mut(path)?;
        if let Some(uid) = uid {
            node.uid = uid;
        }
        if let Some(gid) = gid {
            node.gid = gid;
        }
        Ok(())
    }

    fn truncate(&self, path: &str, length: u64) -> Result<(), StoreError> {
        let mut ns = self.lock();
        let node = ns.node_mut(path)?;
        if node.kind == FileType::Directory {
            return Err(StoreError::IsADirectory(path.to_string()));
        }
        node.data.resize(length as usize, 0);
        node.mtime_us = now_micros();
        Ok(())
    }

    fn set_times(&self, path: &str, mtime: i64, atime: i64) -> Result<(), StoreError> {
        let mut ns = self.lock();
        let node = ns.node_mut(path)?;
        node.mtime_us = mtime;
        node.atime_us = atime;
        Ok(())
    }

    fn uid_of(&self, user: &str) -> Result<u32, StoreError> {
        self.lock()
            .users
            .get(user)
            .map(|(uid, _)| *uid)
            .ok_or_else(|| StoreError::UnknownUser(user.to_string()))
    }

    fn gid_of_user(&self, user: &str) -> Result<u32, StoreError> {
        self.lock()
            .users
            .get(user)
            .map(|(_, gid)| *gid)
            .ok_or_else(|| StoreError::UnknownUser(user.to_string()))
    }

    fn user_name(&self, uid: u32) -> Result<String, StoreError> {
        let ns = self.lock();
        Ok(ns
            .users
            .iter()
            .find(|(_, (id, _))| *id == uid)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| uid.to_string()))
    }

    fn group_name(&self, gid: u32) -> Result<String, StoreError> {
        let ns = self.lock();
        Ok(ns
            .groups
            .iter()
            .find(|(_, id)| **id == gid)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| gid.to_string()))
    }

    fn replica_number(&self) -> u32 {
        self.replicas
    }

    fn block_size(&self) -> u64 {
        self.block_size
    }

    fn supports_exclusive_create(&self) -> bool {
        self.exclusive_create
    }
}

/// Handle returned by `MemoryStorage::open`.
struct MemoryFile {
    inner: Arc<Mutex<Namespace>>,
    path: String,
    flags: OpenFlags,
    pos: u64,
}

impl MemoryFile {
    fn lock(&self) -> MutexGuard<'_, Namespace> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn vanished(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} was removed", path))
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.flags.contains(OpenFlags::READ) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file not opened for reading",
            ));
        }
        let pos = self.pos as usize;
        let n = {
            let mut ns = self.lock();
            let node = ns.nodes.get_mut(&self.path).ok_or_else(|| vanished(&self.path))?;
            node.atime_us = now_micros();
            if pos >= node.data.len() {
                0
            } else {
                let n = buf.len().min(node.data.len() - pos);
                buf[..n].copy_from_slice(&node.data[pos..pos + n]);
                n
            }
        };
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.flags.contains(OpenFlags::WRITE) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file not opened for writing",
            ));
        }
        let append = self.flags.contains(OpenFlags::APPEND);
        let end = {
            let mut ns = self.lock();
            let node = ns.nodes.get_mut(&self.path).ok_or_else(|| vanished(&self.path))?;
            let start = if append { node.data.len() } else { self.pos as usize };
            let end = start + buf.len();
            if node.data.len() < end {
                node.data.resize(end, 0);
            }
            node.data[start..end].copy_from_slice(buf);
            node.mtime_us = now_micros();
            end
        };
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let len = {
            let ns = self.lock();
            ns.nodes
                .get(&self.path)
                .map(|node| node.data.len() as i64)
                .ok_or_else(|| vanished(&self.path))?
        };
        let target = match from {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::End(n) => len + n,
            SeekFrom::Current(n) => self.pos as i64 + n,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

impl StoreFile for MemoryFile {}

/// Hands out a shared `MemoryStorage` regardless of the volume requested.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    storage: MemoryStorage,
}

impl MemoryConnector {
    pub fn new(storage: MemoryStorage) -> Self {
        Self { storage }
    }
}

impl StorageConnector for MemoryConnector {
    fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn FileStorage>, StoreError> {
        debug!(
            "memory store: mounting volume {} (owner {}, masters {})",
            config.volume_name, config.owner, config.masters
        );
        Ok(Arc::new(self.storage.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: Identity = Identity { uid: 0, gid: 0 };

    fn write_file(store: &MemoryStorage, path: &str, data: &[u8]) {
        let mut file = store.open(path, &OpenIntent::create(0o644, ID)).unwrap();
        file.write_all(data).unwrap();
        file.close().unwrap();
    }

    #[test]
    fn test_mkdirs_and_list() {
        let store = MemoryStorage::new();
        assert!(store.mkdirs("/a/b/c", 0o755, 0, 0).unwrap());
        write_file(&store, "/a/b/f", b"x");
        let names: Vec<_> = store
            .list("/a/b")
            .unwrap()
            .into_iter()
            .map(|s| s.name.unwrap())
            .collect();
        assert_eq!(names, vec!["c", "f"]);
    }

    #[test]
    fn test_symlink_is_reported_as_link() {
        let store = MemoryStorage::new();
        store.symlink("/l", "/target", 0, 0).unwrap();
        let info = store.stat("/l").unwrap().unwrap();
        assert_eq!(info.kind(), FileType::Link);
        assert_eq!(info.mode() & 0o170000, 0o120000);
        assert_eq!(store.read_all("/l").unwrap(), b"/target");
        assert!(matches!(
            store.symlink("/l", "/other", 0, 0),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(store.symlink("/missing/l", "/t", 0, 0).is_err());
    }

    #[test]
    fn test_mkdirs_over_file_returns_false() {
        let store = MemoryStorage::new();
        write_file(&store, "/f", b"x");
        assert!(!store.mkdirs("/f/sub", 0o755, 0, 0).unwrap());
    }

    #[test]
    fn test_exclusive_create_rejects_existing() {
        let store = MemoryStorage::new();
        write_file(&store, "/f", b"x");
        let err = store
            .open("/f", &OpenIntent::create_exclusive(0o644, ID))
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn test_append_writes_at_end() {
        let store = MemoryStorage::new();
        write_file(&store, "/f", b"abc");
        let mut file = store.open("/f", &OpenIntent::append(0o644, ID)).unwrap();
        file.write_all(b"def").unwrap();
        assert_eq!(store.read_all("/f").unwrap(), b"abcdef");
    }

    #[test]
    fn test_rename_directory_moves_subtree() {
        let store = MemoryStorage::new();
        store.mkdirs("/src/inner", 0o755, 0, 0).unwrap();
        write_file(&store, "/src/inner/f", b"x");
        store.rename("/src", "/dst").unwrap();
        assert!(store.stat("/src").unwrap().is_none());
        assert!(store.stat("/dst/inner/f").unwrap().is_some());
    }

    #[test]
    fn test_rmdir_non_recursive_on_non_empty() {
        let store = MemoryStorage::new();
        store.mkdirs("/d", 0o755, 0, 0).unwrap();
        write_file(&store, "/d/f", b"x");
        assert!(matches!(
            store.rmdir("/d", false),
            Err(StoreError::NotEmpty(_))
        ));
        store.rmdir("/d", true).unwrap();
        assert!(store.stat("/d/f").unwrap().is_none());
    }

    #[test]
    fn test_stat_times_in_seconds() {
        let store = MemoryStorage::new();
        write_file(&store, "/f", b"x");
        store.set_times("/f", 7_000_000, 3_000_000).unwrap();
        let info = store.stat("/f").unwrap().unwrap();
        assert_eq!((info.mtime, info.atime), (7, 3));
    }

    #[test]
    fn test_chown_unknown_user() {
        let store = MemoryStorage::new();
        write_file(&store, "/f", b"x");
        assert!(matches!(
            store.chown("/f", "nobody", ""),
            Err(StoreError::UnknownUser(_))
        ));
    }
}
