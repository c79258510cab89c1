//! Core types and pure computations for the churn pipeline.
//!
//! Holds the dataset model, the currency normalizer, the metrics engine and
//! its per-view summaries, display formatting, timestamp helpers, the shared
//! error type and the command-line settings.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod metrics;
pub mod models;
pub mod settings;
pub mod summary;
pub mod time_utils;

pub use error::{ChurnError, Result};
