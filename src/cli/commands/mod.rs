//! Command implementations.

pub mod completions;
pub mod init;
pub mod punch;
pub mod record;
pub mod table;
pub mod version;

use crate::config::{resolve_db_path, store_options};
use crate::error::Result;
use crate::storage::SchemaAwareStore;
use std::path::PathBuf;
use tracing::debug;

/// Open the store for a command, resolving path and timeouts from config.
pub(crate) fn open_store(db_path: Option<&PathBuf>) -> Result<SchemaAwareStore> {
    let path = resolve_db_path(db_path.map(PathBuf::as_path));
    let options = store_options()?;
    debug!(path = %path.display(), ?options, "Opening store");
    SchemaAwareStore::open_with_options(&path, options)
}

/// Print a value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
