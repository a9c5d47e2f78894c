//! Initialize a timecard database.
//!
//! Creates the database file (if needed) and the `timecard` table. Running
//! it again against an initialized database is a no-op.

use super::{open_store, print_json};
use crate::error::{Error, Result};
use crate::model::{timecard_table, TIMECARD_TABLE};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Serialize)]
struct InitOutput {
    database: Option<PathBuf>,
    table: &'static str,
    created: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the table created.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;

    let created = match store.create_table(TIMECARD_TABLE, &timecard_table()) {
        Ok(()) => true,
        // Another process got there first
        Err(Error::TableAlreadyExists { .. }) => false,
        Err(e) => return Err(e),
    };

    if created {
        info!(table = TIMECARD_TABLE, "Initialized timecard table");
    }

    let output = InitOutput {
        database: store.path().map(PathBuf::from),
        table: TIMECARD_TABLE,
        created,
    };

    if json {
        return print_json(&output);
    }

    let location = output
        .database
        .as_ref()
        .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
    if created {
        println!("{} {location}", "Initialized".green().bold());
    } else {
        println!("Already initialized: {location}");
    }
    Ok(())
}
