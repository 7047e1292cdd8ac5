//! Data layer for spotify-wrapped.
//!
//! Responsible for discovering and reading JSON exports, classifying a batch
//! as raw history or processed stats, date filtering, aggregation, ranking
//! and the top-level statistics pipeline.

pub mod aggregator;
pub mod analysis;
pub mod detector;
pub mod filter;
pub mod ranker;
pub mod reader;

pub use wrapped_core as core;
