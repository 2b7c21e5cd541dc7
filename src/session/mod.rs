//! Session state
//!
//! Per-instance state threaded through every filesystem operation.

pub mod state;

pub use state::Session;
