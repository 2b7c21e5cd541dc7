//! Stream wrappers
//!
//! Thin delegating wrappers over store file handles that feed the shared
//! I/O statistics.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::storage::StoreFile;

/// I/O counters shared by a filesystem instance and its streams.
#[derive(Debug, Default)]
pub struct Statistics {
    read_ops: AtomicU64,
    write_ops: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
}

impl Statistics {
    pub fn increment_read_ops(&self, n: u64) {
        self.read_ops.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_write_ops(&self, n: u64) {
        self.write_ops.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_bytes_read(&self, n: u64) {
        self.bytes_read.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_bytes_written(&self, n: u64) {
        self.bytes_written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn read_ops(&self) -> u64 {
        self.read_ops.load(Ordering::Relaxed)
    }

    pub fn write_ops(&self) -> u64 {
        self.write_ops.load(Ordering::Relaxed)
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

/// Readable, seekable stream over a store file.
pub struct InputStream {
    file: Box<dyn StoreFile>,
    statistics: Arc<Statistics>,
    pos: u64,
}

impl InputStream {
    pub fn new(file: Box<dyn StoreFile>, statistics: Arc<Statistics>) -> Self {
        Self {
            file,
            statistics,
            pos: 0,
        }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn close(mut self) -> io::Result<()> {
        self.file.close()
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = self.file.read(buf)?;
        self.pos += n as u64;
        self.statistics.increment_bytes_read(n as u64);
        Ok(n)
    }
}

impl Seek for InputStream {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        self.pos = self.file.seek(from)?;
        Ok(self.pos)
    }
}

/// Writable stream over a store file.
pub struct OutputStream {
    file: Box<dyn StoreFile>,
    statistics: Arc<Statistics>,
    written: u64,
}

impl OutputStream {
    pub fn new(file: Box<dyn StoreFile>, statistics: Arc<Statistics>) -> Self {
        Self {
            file,
            statistics,
            written: 0,
        }
    }

    /// Bytes written through this stream.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    pub fn close(mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.close()
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.written += n as u64;
        self.statistics.increment_bytes_written(n as u64);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
