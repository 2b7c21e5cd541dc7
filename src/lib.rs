//! ChubaoFS-style `cfs://` filesystem adapter.
//!
//! Exposes a Hadoop-compatible filesystem surface over a `FileStorage`
//! volume: site configuration, path resolution, permission and status
//! translation, streams and an interactive shell.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod navigate;
pub mod permission;
pub mod session;
pub mod shell;
pub mod status;
pub mod storage;
pub mod utils;

pub use filesystem::CfsFileSystem;
