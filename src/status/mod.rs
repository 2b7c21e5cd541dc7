//! File status conversion
//!
//! Builds framework file-status records from the store's raw stat records.

pub mod convert;
pub mod results;

pub use convert::{convert, convert_at};
pub use results::{BlockLocation, ChecksumType, FileRecord, ServerDefaults};
