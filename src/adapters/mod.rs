//! External system integrations for Quarry.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`source`] - Record source abstraction (trait-based) with in-memory and
//!   JSON lines implementations
//! - [`sink`] - Sink abstraction layer (trait-based)
//! - [`bigquery`] - Google BigQuery implementation of the sink
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with fake implementations. The exporter only sees the
//! [`source::RecordSource`] and [`sink::SinkClient`] traits.
//!
//! # BigQuery Adapter
//!
//! ```rust,no_run
//! use quarry::adapters::bigquery::BigQueryClient;
//! use quarry::adapters::sink::SinkClient;
//! use quarry::config::{secret_string, BigQueryConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BigQueryConfig {
//!     project: Some("my-project".to_string()),
//!     access_token: Some(secret_string("ya29.token".to_string())),
//!     ..Default::default()
//! };
//!
//! let client = BigQueryClient::new(config)?;
//! let table = client.get_table("analytics.items")?;
//! println!("Columns: {:?}", table.schema.column_names());
//! # Ok(())
//! # }
//! ```

pub mod bigquery;
pub mod sink;
pub mod source;
