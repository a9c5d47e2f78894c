//! Timecard store - schema-aware SQLite access for a timecard tracker
//!
//! This crate provides the data-access layer and the `tc` CLI built on it.
//!
//! # Architecture
//!
//! - [`storage`] - Schema-aware SQLite store (schema cache, CRUD, serialization)
//! - [`validate`] - Identifier, column-spec and condition parsing for callers
//! - [`model`] - Data types (`TimecardEntry`)
//! - [`config`] - Database path and timeout resolution
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```
//! use tc::storage::{record, ColumnSpec, Criterion, Operator, SchemaAwareStore};
//!
//! let store = SchemaAwareStore::open_memory()?;
//! store.create_table(
//!     "people",
//!     &[
//!         ColumnSpec::new("id", "INTEGER").with_options("PRIMARY KEY"),
//!         ColumnSpec::new("name", "TEXT"),
//!     ],
//! )?;
//! store.insert_record("people", &record([("name", "Alice".into())]))?;
//!
//! let found = store.search_for_records(
//!     "people",
//!     &[Criterion::new("name", Operator::Eq, "Alice")],
//!     None,
//! )?;
//! assert_eq!(found.len(), 1);
//! # Ok::<(), tc::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};
