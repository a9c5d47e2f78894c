//! Table management commands.
//!
//! - `tc table list` - List tables and their columns
//! - `tc table show <name>` - Show columns and row count
//! - `tc table create <name> --column "<name> <type> ..."` - Create a table
//! - `tc table drop <name>` - Drop a table

use super::{open_store, print_json};
use crate::cli::TableCommands;
use crate::error::Result;
use crate::storage::ColumnSpec;
use crate::validate::{parse_column_spec, validate_identifier};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct TableOutput {
    name: String,
    columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
}

#[derive(Serialize)]
struct TableListOutput {
    tables: Vec<TableOutput>,
    count: usize,
}

#[derive(Serialize)]
struct TableChangeOutput<'a> {
    table: &'a str,
    action: &'a str,
}

/// Execute a table command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, a name fails
/// validation, or the underlying operation fails.
pub fn execute(command: &TableCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        TableCommands::List => execute_list(db_path, json),
        TableCommands::Show { name } => execute_show(name, db_path, json),
        TableCommands::Create { name, columns } => execute_create(name, columns, db_path, json),
        TableCommands::Drop { name } => execute_drop(name, db_path, json),
    }
}

fn execute_list(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;
    let schema = store.schema()?;

    let tables: Vec<TableOutput> = schema
        .iter()
        .map(|(name, columns)| TableOutput {
            name: name.to_string(),
            columns: columns.to_vec(),
            rows: None,
        })
        .collect();

    if json {
        let count = tables.len();
        return print_json(&TableListOutput { tables, count });
    }

    if tables.is_empty() {
        println!("No tables. Run `tc init` to create the timecard table.");
        return Ok(());
    }

    for table in &tables {
        println!("{} ({})", table.name.bold(), table.columns.join(", "));
    }
    Ok(())
}

fn execute_show(name: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;
    let columns = store.columns(name)?;
    let rows = store.count_records(name)?;

    let output = TableOutput {
        name: name.to_string(),
        columns,
        rows: Some(rows),
    };

    if json {
        return print_json(&output);
    }

    println!("{}", output.name.bold());
    for (i, column) in output.columns.iter().enumerate() {
        println!("  {i:>2}  {column}");
    }
    println!("{} {rows}", "Rows:".dimmed());
    Ok(())
}

fn execute_create(
    name: &str,
    columns: &[String],
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let name = validate_identifier(name)?;
    let specs = columns
        .iter()
        .map(|c| parse_column_spec(c))
        .collect::<Result<Vec<ColumnSpec>>>()?;

    let store = open_store(db_path)?;
    store.create_table(name, &specs)?;

    if json {
        return print_json(&TableChangeOutput {
            table: name,
            action: "created",
        });
    }

    println!("{} {name}", "Created table".green());
    Ok(())
}

fn execute_drop(name: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let name = validate_identifier(name)?;
    let store = open_store(db_path)?;
    store.drop_table(name)?;

    if json {
        return print_json(&TableChangeOutput {
            table: name,
            action: "dropped",
        });
    }

    println!("{} {name}", "Dropped table".yellow());
    Ok(())
}
