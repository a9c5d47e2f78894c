//! SQLite storage layer.
//!
//! This module provides the data-access layer using SQLite with:
//! - A schema cache that validates table/column names before SQL runs
//! - Parameter binding for every data value
//! - One bounded critical section serializing all statements
//!
//! # Submodules
//!
//! - [`query`] - Statement construction and WHERE criteria
//! - [`schema`] - Catalog introspection and table definitions
//! - [`sqlite`] - The schema-aware store
//! - [`value`] - Cell values and records

pub mod query;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use query::{Criterion, Operator};
pub use schema::{ColumnSpec, SchemaCache};
pub use sqlite::{SchemaAwareStore, StoreOptions, ID_COLUMN};
pub use value::{record, Record, Value};
