//! Navigate module
//!
//! Turns the path-like values callers hand the filesystem (relative,
//! absolute, `cfs://` qualified) into the slash-rooted paths the store
//! understands.

mod operations;
mod uri;

// Re-export public types and functions
pub use operations::{join_child, normalize, parent, qualify, resolve};
pub use uri::FsUri;
