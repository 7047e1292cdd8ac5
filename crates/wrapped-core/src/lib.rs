//! Core types for spotify-wrapped.
//!
//! Canonical event and statistics models, the error taxonomy, raw-record
//! normalisation, timezone handling, display formatting and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod normalizer;
pub mod settings;
pub mod time_utils;

pub use error::{Result, WrappedError};
