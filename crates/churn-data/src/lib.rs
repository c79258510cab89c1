//! Data ingestion layer for the churn pipeline.
//!
//! Responsible for parsing delimited exports, building the normalized
//! [`Dataset`](churn_core::models::Dataset), and the file-backed stores of the
//! data directory: snapshot history, last-update record and uploads.

pub mod builder;
pub mod history;
pub mod last_update;
pub mod layout;
pub mod parser;
pub mod upload;

pub use churn_core as core;
