//! Schema introspection and table definitions.
//!
//! The [`SchemaCache`] mirrors the database catalog: table name → column
//! names in declaration order. It is loaded from `sqlite_master` and
//! `pragma_table_info`, and rebuilt wholesale after every DDL statement.

use rusqlite::{Connection, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// In-memory copy of the database's table/column structure.
///
/// Lookups ignore ASCII case, as SQLite does for identifiers; names come
/// back in their declared spelling. An empty cache means the database has
/// no user tables yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCache {
    /// Keyed by lowercased table name.
    tables: BTreeMap<String, CachedTable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedTable {
    name: String,
    columns: Vec<String>,
}

impl SchemaCache {
    /// Whether `table` is a known table.
    #[must_use]
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(&table.to_ascii_lowercase())
    }

    /// Ordered column names for `table`.
    #[must_use]
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables
            .get(&table.to_ascii_lowercase())
            .map(|t| t.columns.as_slice())
    }

    /// Table names, sorted case-insensitively.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.values().map(|t| t.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterate `(table, columns)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables
            .values()
            .map(|t| (t.name.as_str(), t.columns.as_slice()))
    }

    fn insert(&mut self, name: String, columns: Vec<String>) {
        self.tables
            .insert(name.to_ascii_lowercase(), CachedTable { name, columns });
    }
}

/// Read the catalog into a fresh [`SchemaCache`].
///
/// Engine-internal tables (`sqlite_sequence`, `sqlite_stat1`, ...) are skipped.
///
/// # Errors
///
/// Returns the native error if either catalog query fails.
pub fn load_schema(conn: &Connection) -> Result<SchemaCache> {
    let tables: Vec<String> = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY name",
        )?
        .query_map([], |row| row.get(0))?
        .collect::<Result<_>>()?;

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let mut cache = SchemaCache::default();
    for table in tables {
        let columns: Vec<String> = stmt
            .query_map([&table], |row| row.get(0))?
            .collect::<Result<_>>()?;
        cache.insert(table, columns);
    }

    Ok(cache)
}

/// One column of a `CREATE TABLE` statement.
///
/// Rendered verbatim as `"<name> <sql_type>[ <options>]"`. None of the parts
/// are escaped: they are DDL structure, not data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            options: None,
        }
    }

    /// Attach a constraint clause such as `PRIMARY KEY` or `NOT NULL`.
    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// The column's DDL fragment.
    #[must_use]
    pub fn render(&self) -> String {
        match self.options.as_deref().map(str::trim) {
            Some(opts) if !opts.is_empty() => format!("{} {} {opts}", self.name, self.sql_type),
            _ => format!("{} {}", self.name, self.sql_type),
        }
    }
}

/// Build `CREATE TABLE <name> (<col>, <col>, ...)`, preserving column order.
#[must_use]
pub fn create_table_sql(name: &str, columns: &[ColumnSpec]) -> String {
    let body = columns
        .iter()
        .map(ColumnSpec::render)
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {name} ({body})")
}
