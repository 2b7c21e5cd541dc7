//! Permission and ownership translation
//!
//! Bridges the framework's permission/owner model and the store's numeric
//! mode, uid and gid.

pub mod identity;
pub mod mode;

pub use identity::{owner_names, resolve_identity};
pub use mode::{FsPermission, apply_umask, default_dir_mode, default_file_mode, umask};
