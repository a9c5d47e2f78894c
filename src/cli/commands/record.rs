//! Record commands.
//!
//! - `tc insert <table> --record '{...}'` or `--values '[...]' [--columns a,b]`
//! - `tc get <table> <id> [--fields a,b]`
//! - `tc search <table> [--where "<field> <op> <value>"]... [--fields a,b]`
//! - `tc update <table> --set '{...}' --where ...`
//! - `tc delete <table> --where ...`

use super::{open_store, print_json};
use crate::cli::output::render_records;
use crate::cli::{DeleteArgs, GetArgs, InsertArgs, SearchArgs, UpdateArgs};
use crate::error::{Error, Result};
use crate::storage::{Criterion, Record, SchemaAwareStore, Value};
use crate::validate::{parse_condition, parse_value};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value as Json;
use std::path::PathBuf;

#[derive(Serialize)]
struct AffectedOutput<'a> {
    table: &'a str,
    action: &'a str,
    rows: usize,
}

#[derive(Serialize)]
struct RecordsOutput<'a> {
    table: &'a str,
    records: &'a [Record],
    count: usize,
}

/// Convert one JSON scalar to a cell value.
fn json_to_value(key: &str, json: Json) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(b.into()),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Real))
            .ok_or_else(|| Error::InvalidArgument(format!("{key}: number out of range"))),
        Json::String(s) => Ok(Value::Text(s)),
        Json::Array(_) | Json::Object(_) => Err(Error::InvalidArgument(format!(
            "{key}: nested arrays and objects are not storable"
        ))),
    }
}

/// Parse a JSON object argument into a record.
fn parse_record(flag: &str, input: &str) -> Result<Record> {
    let Json::Object(map) = serde_json::from_str(input)? else {
        return Err(Error::InvalidArgument(format!("{flag} must be a JSON object")));
    };
    map.into_iter()
        .map(|(k, v)| json_to_value(&k, v).map(|v| (k, v)))
        .collect()
}

/// Parse a JSON array argument into positional values.
fn parse_values(input: &str) -> Result<Vec<Value>> {
    let Json::Array(items) = serde_json::from_str(input)? else {
        return Err(Error::InvalidArgument("--values must be a JSON array".to_string()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| json_to_value(&format!("value {i}"), v))
        .collect()
}

fn parse_conditions(conditions: &[String]) -> Result<Vec<Criterion>> {
    conditions.iter().map(|c| parse_condition(c)).collect()
}

fn print_affected(table: &str, action: &str, rows: usize, json: bool) -> Result<()> {
    if json {
        return print_json(&AffectedOutput { table, action, rows });
    }
    let noun = if rows == 1 { "row" } else { "rows" };
    println!("{} {rows} {noun} in {table}", capitalize(action).green());
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

fn print_records(
    store: &SchemaAwareStore,
    table: &str,
    rows: &[Record],
    fields: Option<&[String]>,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(&RecordsOutput {
            table,
            records: rows,
            count: rows.len(),
        });
    }

    if rows.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    let order = match fields {
        Some(f) => f.to_vec(),
        None => store.columns(table)?,
    };
    print!("{}", render_records(rows, Some(order.as_slice())));
    Ok(())
}

/// Execute `tc insert`.
///
/// # Errors
///
/// Returns an error if the arguments don't parse or the store rejects the row.
pub fn execute_insert(args: &InsertArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;

    let rows = if let Some(record) = &args.record {
        store.insert_record(&args.table, &parse_record("--record", record)?)?
    } else {
        let values = parse_values(args.values.as_deref().unwrap_or("[]"))?;
        match &args.columns {
            Some(columns) => store.insert_columns(&args.table, columns.as_slice(), &values)?,
            None => store.insert_positional(&args.table, &values)?,
        }
    };

    print_affected(&args.table, "inserted", rows, json)
}

/// Execute `tc get`.
///
/// # Errors
///
/// Returns an error if the table or a field is unknown.
pub fn execute_get(args: &GetArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;
    let fields = args.fields.as_deref();
    let rows = store.get_record_by_id(&args.table, parse_value(&args.id), fields)?;
    print_records(&store, &args.table, &rows, fields, json)
}

/// Execute `tc search`.
///
/// # Errors
///
/// Returns an error if a condition doesn't parse or names an unknown column.
pub fn execute_search(args: &SearchArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let criteria = parse_conditions(&args.conditions)?;
    let store = open_store(db_path)?;
    let fields = args.fields.as_deref();
    let rows = store.search_for_records(&args.table, &criteria, fields)?;
    print_records(&store, &args.table, &rows, fields, json)
}

/// Execute `tc update`.
///
/// # Errors
///
/// Returns an error if the arguments don't parse or the store rejects the change.
pub fn execute_update(args: &UpdateArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let changes = parse_record("--set", &args.set)?;
    let criteria = parse_conditions(&args.conditions)?;
    let store = open_store(db_path)?;
    let rows = store.update_record(&args.table, &changes, &criteria)?;
    print_affected(&args.table, "updated", rows, json)
}

/// Execute `tc delete`.
///
/// # Errors
///
/// Returns an error if a condition doesn't parse or names an unknown column.
pub fn execute_delete(args: &DeleteArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let criteria = parse_conditions(&args.conditions)?;
    let store = open_store(db_path)?;
    let rows = store.delete_record(&args.table, &criteria)?;
    print_affected(&args.table, "deleted", rows, json)
}
