//! Record transformation
//!
//! This module turns source records into rows the sink accepts:
//!
//! - [`sanitize`]: raw values → sink-compliant scalars, with schema-driven
//!   null defaults
//! - [`fields`]: declared field list → one row per record, dispatching each
//!   field to a custom extractor or a record attribute

pub mod fields;
pub mod sanitize;

pub use fields::{process_record, resolve_field, CustomField, FieldRegistry};
pub use sanitize::{format_timestamp, null_default, Sanitizer, TIMESTAMP_FORMAT};
