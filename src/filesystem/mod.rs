//! Filesystem adapter
//!
//! `CfsFileSystem` maps the framework's filesystem verbs onto a
//! `FileStorage` volume.

mod adapter;
mod flags;
mod internal;
mod operations;
pub mod streams;
mod unsupported;

pub use adapter::CfsFileSystem;
pub use flags::CreateFlags;
pub use streams::{InputStream, OutputStream, Statistics};
pub use unsupported::{AclEntry, AclStatus, FileChecksum, FsStatus, XAttrSetFlag};
