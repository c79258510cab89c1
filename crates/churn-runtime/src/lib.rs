//! Runtime layer for the churn pipeline.
//!
//! Owns everything that blocks or touches the network: fetching the remote
//! export and choosing which raw source feeds the dataset builder.

pub mod remote;
pub mod resolver;

pub use churn_core as core;
pub use churn_data as data;
