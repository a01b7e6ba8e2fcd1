//! BigQuery sink adapter
//!
//! REST implementation of [`SinkClient`](crate::adapters::sink::SinkClient)
//! for Google BigQuery:
//! - `tables.get` for the column schema
//! - `tabledata.insertAll` for row inserts, with per-row errors
//! - `jobs.query` for count checks

pub mod client;
pub mod models;

pub use crate::config::BigQueryConfig;
pub use client::{BigQueryClient, METADATA_CALL_DEADLINE};
pub use models::TableReference;
