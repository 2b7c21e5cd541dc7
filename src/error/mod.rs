//! Error handling
//!
//! Defines error types and handling for the CFS adapter.

pub mod handlers;
pub mod types;

pub use types::*;
