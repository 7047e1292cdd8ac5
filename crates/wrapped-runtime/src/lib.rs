//! Runtime layer for spotify-wrapped.
//!
//! Loads upload batches concurrently, builds immutable sessions from them
//! and guards which batch's session becomes visible.

pub mod loader;
pub mod session;
pub mod store;

pub use wrapped_core as core;
pub use wrapped_data as data;
