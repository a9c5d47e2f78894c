//! Schema-aware SQLite store.
//!
//! [`SchemaAwareStore`] owns one connection and a [`SchemaCache`] of the
//! database structure. Table and column names are checked against the cache
//! before any statement runs; values are always bound as parameters.
//!
//! The connection and the cache sit behind one mutex, so every call runs in
//! the same critical section: writes never interleave, and a reader never
//! sees a cache that is halfway through a refresh. Waiting for that section
//! is bounded by [`StoreOptions::lock_timeout`].

use crate::error::{Error, Result};
use crate::storage::query::{self, quote_ident, Criterion, Operator, Statement};
use crate::storage::schema::{create_table_sql, load_schema, ColumnSpec, SchemaCache};
use crate::storage::value::{Record, Value};
use crate::validate::find_similar_ids;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Name of the identifier column used by [`SchemaAwareStore::get_record_by_id`].
pub const ID_COLUMN: &str = "id";

/// Tunables for opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// How long SQLite's busy handler retries a locked database file.
    pub busy_timeout: Duration,
    /// How long a call waits for the store's critical section.
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            lock_timeout: Duration::from_secs(30),
        }
    }
}

/// State guarded by the store lock.
struct Inner {
    conn: Connection,
    schema: SchemaCache,
    /// Set when DDL ran but the cache has not been reloaded since.
    stale: bool,
}

impl Inner {
    fn new(conn: Connection, schema: SchemaCache) -> Self {
        Self {
            conn,
            schema,
            stale: false,
        }
    }

    fn refresh(&mut self) -> Result<()> {
        self.schema = load_schema(&self.conn)?;
        self.stale = false;
        info!(tables = self.schema.len(), "Schema cache refreshed");
        Ok(())
    }

    fn execute(&self, op: &str, stmt: &Statement) -> Result<usize> {
        debug!(op, sql = %stmt.sql, params = stmt.params.len(), "Executing");
        Ok(self
            .conn
            .execute(&stmt.sql, params_from_iter(&stmt.params))?)
    }

    fn query(&self, op: &str, stmt: &Statement) -> Result<Vec<Record>> {
        debug!(op, sql = %stmt.sql, params = stmt.params.len(), "Querying");
        let mut prepared = self.conn.prepare_cached(&stmt.sql)?;
        let names: Vec<String> = prepared
            .column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let rows = prepared.query_map(params_from_iter(&stmt.params), |row| {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Ok((name.clone(), row.get::<_, Value>(i)?)))
                .collect::<rusqlite::Result<Record>>()
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

/// SQLite-backed data-access layer with an in-memory schema cache.
///
/// The handle is `Send + Sync`; share it across threads with `Arc`.
pub struct SchemaAwareStore {
    inner: Mutex<Inner>,
    lock_timeout: Duration,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SchemaAwareStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaAwareStore")
            .field("path", &self.path)
            .field("lock_timeout", &self.lock_timeout)
            .finish_non_exhaustive()
    }
}

impl SchemaAwareStore {
    /// Open (or create) the database file at `path` and load its schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, StoreOptions::default())
    }

    /// Open with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the file cannot be opened or read.
    pub fn open_with_options(path: &Path, options: StoreOptions) -> Result<Self> {
        let unavailable = |source| Error::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(unavailable)?;
        conn.busy_timeout(options.busy_timeout).map_err(unavailable)?;
        // First catalog read is where a non-database file or unreadable path shows up.
        let schema = load_schema(&conn).map_err(unavailable)?;

        info!(path = %path.display(), tables = schema.len(), "Opened store");
        Ok(Self {
            inner: Mutex::new(Inner::new(conn, schema)),
            lock_timeout: options.lock_timeout,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let schema = load_schema(&conn)?;
        Ok(Self {
            inner: Mutex::new(Inner::new(conn, schema)),
            lock_timeout: StoreOptions::default().lock_timeout,
            path: None,
        })
    }

    /// Backing file, or `None` for an in-memory store.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Acquire the critical section, waiting at most `lock_timeout`.
    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        let started = Instant::now();
        let mut backoff = Duration::from_micros(50);
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => {
                    // Each statement is atomic, so a panicking holder cannot
                    // leave a half-applied write behind.
                    warn!("Store lock was poisoned, recovering");
                    return Ok(poisoned.into_inner());
                }
                Err(TryLockError::WouldBlock) => {
                    let waited = started.elapsed();
                    if waited >= self.lock_timeout {
                        let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
                        warn!(waited_ms, "Timed out waiting for store lock");
                        return Err(Error::LockTimeout { waited_ms });
                    }
                    thread::sleep(backoff.min(self.lock_timeout - waited));
                    backoff = (backoff * 2).min(Duration::from_millis(5));
                }
            }
        }
    }

    /// Run `f` inside the critical section.
    ///
    /// Every public operation goes through here: validation, the statement
    /// and any schema refresh all happen under one lock acquisition.
    fn serialized<F, R>(&self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Inner) -> Result<R>,
    {
        let mut inner = self.lock()?;
        if inner.stale {
            debug!(op, "Reloading stale schema cache");
            inner.refresh()?;
        }
        let result = f(&mut inner);
        if let Err(e) = &result {
            debug!(op, error = %e, "Operation failed");
        }
        result
    }

    // ======================
    // Schema
    // ======================

    /// Rebuild the schema cache from the database catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub fn refresh_schema(&self) -> Result<()> {
        self.serialized("refresh_schema", Inner::refresh)
    }

    /// Snapshot of the schema cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if the store stays busy.
    pub fn schema(&self) -> Result<SchemaCache> {
        self.serialized("schema", |inner| Ok(inner.schema.clone()))
    }

    /// Whether `table` is in the schema cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if the store stays busy.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        self.serialized("has_table", |inner| Ok(inner.schema.contains(table)))
    }

    /// Ordered column names of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] if the table is not cached.
    pub fn columns(&self, table: &str) -> Result<Vec<String>> {
        self.serialized("columns", |inner| {
            require_table(&inner.schema, table).map(<[String]>::to_vec)
        })
    }

    /// Create `name` with the given columns, in order, then refresh the cache.
    ///
    /// # Safety contract
    ///
    /// `name` and every part of every [`ColumnSpec`] are written into the DDL
    /// verbatim. Never pass externally supplied strings without validating
    /// them first (see [`crate::validate::validate_identifier`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableAlreadyExists`] if `name` is cached, or the native
    /// error if SQLite rejects the statement.
    /// If the table is created but reloading the cache fails, that error is
    /// returned and the next call on the store reloads the cache first.
    pub fn create_table(&self, name: &str, columns: &[ColumnSpec]) -> Result<()> {
        self.serialized("create_table", |inner| {
            if inner.schema.contains(name) {
                return Err(Error::TableAlreadyExists {
                    table: name.to_string(),
                });
            }

            let sql = create_table_sql(name, columns);
            debug!(sql = %sql, "Creating table");
            inner.conn.execute(&sql, [])?;
            inner.stale = true;
            info!(table = name, columns = columns.len(), "Created table");
            inner.refresh()
        })
    }

    /// Drop `name`, then refresh the cache.
    ///
    /// Existence is not checked first; dropping a missing table surfaces
    /// SQLite's own error. Same verbatim-identifier contract as
    /// [`create_table`](Self::create_table).
    ///
    /// # Errors
    ///
    /// Returns the native error if SQLite rejects the statement. A failed
    /// cache reload after the drop is retried on the next call.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.serialized("drop_table", |inner| {
            inner.conn.execute(&format!("DROP TABLE {name}"), [])?;
            inner.stale = true;
            info!(table = name, "Dropped table");
            inner.refresh()
        })
    }

    // ======================
    // Insert
    // ======================

    /// Insert the columns present in `record`.
    ///
    /// Every key must be a column of `table`; all offending keys are reported
    /// together. An empty record inserts a row of defaults.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] or [`Error::InvalidColumn`] before
    /// touching the database, or the native error from the insert.
    pub fn insert_record(&self, table: &str, record: &Record) -> Result<usize> {
        self.serialized("insert_record", |inner| {
            let known = require_table(&inner.schema, table)?;
            require_columns(table, known, record.keys().map(String::as_str))?;

            let columns: Vec<String> = record.keys().cloned().collect();
            let values: Vec<Value> = record.values().cloned().collect();
            inner.execute("insert_record", &query::insert(table, Some(columns.as_slice()), values))
        })
    }

    /// Insert a full row given in table column order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`], or [`Error::ColumnCountMismatch`] if
    /// `values` is not exactly one per column.
    pub fn insert_positional(&self, table: &str, values: &[Value]) -> Result<usize> {
        self.serialized("insert_positional", |inner| {
            let known = require_table(&inner.schema, table)?;
            if values.len() != known.len() {
                return Err(Error::ColumnCountMismatch {
                    expected: known.len(),
                    actual: values.len(),
                });
            }

            inner.execute("insert_positional", &query::insert(table, None, values.to_vec()))
        })
    }

    /// Insert `values` into the listed `columns`, pairwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`], [`Error::InvalidColumn`] (all offenders),
    /// or [`Error::ColumnCountMismatch`] if the two lists differ in length.
    pub fn insert_columns<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        values: &[Value],
    ) -> Result<usize> {
        self.serialized("insert_columns", |inner| {
            let known = require_table(&inner.schema, table)?;
            require_columns(table, known, columns.iter().map(AsRef::as_ref))?;
            if columns.len() != values.len() {
                return Err(Error::ColumnCountMismatch {
                    expected: columns.len(),
                    actual: values.len(),
                });
            }

            let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
            inner.execute(
                "insert_columns",
                &query::insert(table, Some(columns.as_slice()), values.to_vec()),
            )
        })
    }

    // ======================
    // Read
    // ======================

    /// Rows whose `id` equals `id`, projected to `fields` when given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`], or [`Error::InvalidColumn`] if a field
    /// (or the `id` column itself) is missing from the table.
    pub fn get_record_by_id(
        &self,
        table: &str,
        id: impl Into<Value>,
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        let criteria = [Criterion::new(ID_COLUMN, Operator::Eq, id)];
        self.serialized("get_record_by_id", |inner| {
            let stmt = validated_select(&inner.schema, table, &criteria, fields)?;
            inner.query("get_record_by_id", &stmt)
        })
    }

    /// Rows matching every criterion (AND, in the given order).
    ///
    /// No criteria returns every row of the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] or [`Error::InvalidColumn`] before
    /// touching the database, or the native error from the query.
    pub fn search_for_records(
        &self,
        table: &str,
        criteria: &[Criterion],
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        self.serialized("search_for_records", |inner| {
            let stmt = validated_select(&inner.schema, table, criteria, fields)?;
            inner.query("search_for_records", &stmt)
        })
    }

    /// Number of rows in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] or the native error.
    pub fn count_records(&self, table: &str) -> Result<usize> {
        self.serialized("count_records", |inner| {
            require_table(&inner.schema, table)?;
            let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
            let count: i64 = inner.conn.query_row(&sql, [], |row| row.get(0))?;
            usize::try_from(count).map_err(|_| Error::Other(format!("negative row count: {count}")))
        })
    }

    // ======================
    // Update / Delete
    // ======================

    /// Set the columns in `changes` on every row matching `criteria`.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`], [`Error::InvalidColumn`] (change keys
    /// and criterion fields together), [`Error::InvalidArgument`] for an empty
    /// change set, or [`Error::CriteriaRequired`] for no criteria.
    pub fn update_record(
        &self,
        table: &str,
        changes: &Record,
        criteria: &[Criterion],
    ) -> Result<usize> {
        self.serialized("update_record", |inner| {
            let known = require_table(&inner.schema, table)?;
            require_columns(
                table,
                known,
                changes
                    .keys()
                    .map(String::as_str)
                    .chain(criteria.iter().map(|c| c.field.as_str())),
            )?;
            if changes.is_empty() {
                return Err(Error::InvalidArgument(
                    "update_record needs at least one column to set".to_string(),
                ));
            }
            if criteria.is_empty() {
                return Err(Error::CriteriaRequired {
                    operation: "update_record",
                });
            }

            let changes: Vec<(String, Value)> = changes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            inner.execute("update_record", &query::update(table, &changes, criteria))
        })
    }

    /// Delete every row matching `criteria`.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`], [`Error::InvalidColumn`], or
    /// [`Error::CriteriaRequired`] for no criteria.
    pub fn delete_record(&self, table: &str, criteria: &[Criterion]) -> Result<usize> {
        self.serialized("delete_record", |inner| {
            let known = require_table(&inner.schema, table)?;
            require_columns(table, known, criteria.iter().map(|c| c.field.as_str()))?;
            if criteria.is_empty() {
                return Err(Error::CriteriaRequired {
                    operation: "delete_record",
                });
            }

            inner.execute("delete_record", &query::delete(table, criteria))
        })
    }
}

/// Cached columns of `table`, or `UnknownTable` with close matches.
fn require_table<'a>(schema: &'a SchemaCache, table: &str) -> Result<&'a [String]> {
    schema.columns(table).ok_or_else(|| {
        let names: Vec<String> = schema.table_names().map(ToString::to_string).collect();
        Error::UnknownTable {
            table: table.to_string(),
            similar: find_similar_ids(table, &names, 3),
        }
    })
}

/// Fail with one `InvalidColumn` naming every unknown column, in first-seen order.
fn require_columns<'a>(
    table: &str,
    known: &[String],
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut invalid: Vec<String> = Vec::new();
    for name in names {
        if !known.iter().any(|k| k.eq_ignore_ascii_case(name))
            && !invalid.iter().any(|i| i.eq_ignore_ascii_case(name))
        {
            invalid.push(name.to_string());
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidColumn {
            table: table.to_string(),
            columns: invalid,
        })
    }
}

fn validated_select(
    schema: &SchemaCache,
    table: &str,
    criteria: &[Criterion],
    fields: Option<&[String]>,
) -> Result<Statement> {
    let known = require_table(schema, table)?;
    require_columns(
        table,
        known,
        fields
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .chain(criteria.iter().map(|c| c.field.as_str())),
    )?;
    Ok(query::select(table, fields, criteria))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::value::record;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn people_store() -> SchemaAwareStore {
        let store = SchemaAwareStore::open_memory().unwrap();
        store
            .create_table(
                "people",
                &[
                    ColumnSpec::new("id", "INTEGER").with_options("PRIMARY KEY"),
                    ColumnSpec::new("name", "TEXT"),
                    ColumnSpec::new("age", "INTEGER"),
                ],
            )
            .unwrap();
        store
    }

    fn seed(store: &SchemaAwareStore) {
        for (name, age) in [("Alice", 30), ("Bob", 45), ("Carol", 31), ("Dan", 22)] {
            store
                .insert_record("people", &record([("name", name.into()), ("age", age.into())]))
                .unwrap();
        }
    }

    fn names(rows: &[Record]) -> HashSet<String> {
        rows.iter()
            .filter_map(|r| r.get("name").and_then(Value::as_text).map(ToString::to_string))
            .collect()
    }

    #[test]
    fn test_open_memory_starts_empty() {
        let store = SchemaAwareStore::open_memory().unwrap();
        assert!(store.schema().unwrap().is_empty());
    }

    #[test]
    fn test_people_example() {
        let store = people_store();

        let affected = store
            .insert_record("people", &record([("name", "Alice".into()), ("age", 30.into())]))
            .unwrap();
        assert_eq!(affected, 1);

        let rows = store.get_record_by_id("people", 1, None).unwrap();
        assert_eq!(
            rows,
            vec![record([
                ("id", Value::Integer(1)),
                ("name", "Alice".into()),
                ("age", Value::Integer(30)),
            ])]
        );
    }

    #[test]
    fn test_create_table_caches_columns_in_order() {
        let store = people_store();
        assert_eq!(store.columns("people").unwrap(), vec!["id", "name", "age"]);
    }

    #[test]
    fn test_create_table_twice_fails() {
        let store = people_store();
        let err = store
            .create_table("people", &[ColumnSpec::new("x", "TEXT")])
            .unwrap_err();
        assert!(matches!(err, Error::TableAlreadyExists { table } if table == "people"));
    }

    /// Run DDL on the store's connection without going through the cache.
    fn exec_external(store: &SchemaAwareStore, sql: &str) {
        store.inner.lock().unwrap().conn.execute_batch(sql).unwrap();
    }

    #[test]
    fn test_table_and_column_names_ignore_case() {
        let store = people_store();
        let err = store
            .create_table("PEOPLE", &[ColumnSpec::new("x", "TEXT")])
            .unwrap_err();
        assert!(matches!(err, Error::TableAlreadyExists { table } if table == "PEOPLE"));

        store
            .insert_record("People", &record([("NAME", "Alice".into())]))
            .unwrap();
        let rows = store
            .search_for_records("people", &[Criterion::new("Name", Operator::Eq, "Alice")], None)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::from("Alice"));
        assert_eq!(store.count_records("PEOPLE").unwrap(), 1);
    }

    #[test]
    fn test_reserved_and_spaced_column_names() {
        let store = SchemaAwareStore::open_memory().unwrap();
        exec_external(
            &store,
            r#"CREATE TABLE orders (id INTEGER PRIMARY KEY, "order" INTEGER, "ship date" TEXT)"#,
        );
        store.refresh_schema().unwrap();
        assert_eq!(store.columns("orders").unwrap(), vec!["id", "order", "ship date"]);

        store
            .insert_record(
                "orders",
                &record([("order", 5.into()), ("ship date", "2026-01-02".into())]),
            )
            .unwrap();
        store
            .insert_positional("orders", &[Value::Null, 6.into(), "2026-01-03".into()])
            .unwrap();

        let fields = vec!["order".to_string()];
        let rows = store
            .search_for_records(
                "orders",
                &[Criterion::new("ship date", Operator::Eq, "2026-01-02")],
                Some(fields.as_slice()),
            )
            .unwrap();
        assert_eq!(rows, vec![record([("order", 5.into())])]);

        let updated = store
            .update_record(
                "orders",
                &record([("ship date", "2026-02-01".into())]),
                &[Criterion::new("order", Operator::Eq, 6)],
            )
            .unwrap();
        assert_eq!(updated, 1);
        let deleted = store
            .delete_record("orders", &[Criterion::new("ship date", Operator::Eq, "2026-02-01")])
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.count_records("orders").unwrap(), 1);
    }

    #[test]
    fn test_stale_cache_is_reloaded_on_next_call() {
        let store = people_store();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.conn.execute_batch("CREATE TABLE late (v TEXT)").unwrap();
            inner.stale = true;
        }
        assert!(store.has_table("late").unwrap());
        assert_eq!(store.columns("late").unwrap(), vec!["v"]);
    }

    #[test]
    fn test_drop_table_removes_cache_entry() {
        let store = people_store();
        store.drop_table("people").unwrap();

        assert!(!store.has_table("people").unwrap());
        let err = store
            .insert_record("people", &record([("name", "Alice".into())]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTable { .. }));
    }

    #[test]
    fn test_drop_missing_table_is_native_error() {
        let store = SchemaAwareStore::open_memory().unwrap();
        let err = store.drop_table("ghosts").unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_unknown_table_for_every_operation() {
        let store = people_store();
        let crit = [Criterion::new("id", Operator::Eq, 1)];
        let row = record([("name", "x".into())]);

        let results = [
            store.insert_record("peeple", &row).map(|_| ()),
            store.insert_positional("peeple", &[Value::Null]).map(|_| ()),
            store.insert_columns("peeple", &["name"], &["x".into()]).map(|_| ()),
            store.get_record_by_id("peeple", 1, None).map(|_| ()),
            store.search_for_records("peeple", &crit, None).map(|_| ()),
            store.update_record("peeple", &row, &crit).map(|_| ()),
            store.delete_record("peeple", &crit).map(|_| ()),
            store.count_records("peeple").map(|_| ()),
        ];
        for result in results {
            match result {
                Err(Error::UnknownTable { table, similar }) => {
                    assert_eq!(table, "peeple");
                    assert_eq!(similar, vec!["people".to_string()]);
                }
                other => panic!("expected UnknownTable, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_column_leaves_table_untouched() {
        let store = people_store();
        let err = store
            .insert_record(
                "people",
                &record([("name", "Alice".into()), ("shoe_size", 9.into())]),
            )
            .unwrap_err();

        match err {
            Error::InvalidColumn { columns, .. } => assert_eq!(columns, vec!["shoe_size"]),
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
        assert_eq!(store.count_records("people").unwrap(), 0);
    }

    #[test]
    fn test_invalid_columns_reported_together() {
        let store = people_store();
        let err = store
            .insert_record(
                "people",
                &record([
                    ("name", "Alice".into()),
                    ("nickname", "Al".into()),
                    ("shoe_size", 9.into()),
                ]),
            )
            .unwrap_err();

        match err {
            Error::InvalidColumn { table, columns } => {
                assert_eq!(table, "people");
                assert_eq!(columns, vec!["nickname", "shoe_size"]);
            }
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_record_inserts_defaults() {
        let store = people_store();
        assert_eq!(store.insert_record("people", &Record::new()).unwrap(), 1);

        let rows = store.get_record_by_id("people", 1, None).unwrap();
        assert_eq!(rows[0]["name"], Value::Null);
    }

    #[test]
    fn test_positional_insert_follows_column_order() {
        let store = people_store();
        let affected = store
            .insert_positional("people", &[Value::Integer(7), "Eve".into(), 52.into()])
            .unwrap();
        assert_eq!(affected, 1);

        let rows = store.get_record_by_id("people", 7, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::from("Eve"));
        assert_eq!(rows[0]["age"], Value::Integer(52));
    }

    #[test]
    fn test_positional_insert_count_mismatch() {
        let store = people_store();
        let err = store
            .insert_positional("people", &["Eve".into(), 52.into()])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnCountMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.count_records("people").unwrap(), 0);
    }

    #[test]
    fn test_insert_columns() {
        let store = people_store();
        store
            .insert_columns("people", &["age", "name"], &[19.into(), "Fay".into()])
            .unwrap();
        let rows = store.get_record_by_id("people", 1, None).unwrap();
        assert_eq!(rows[0]["name"], Value::from("Fay"));
        assert_eq!(rows[0]["age"], Value::Integer(19));

        let err = store
            .insert_columns("people", &["age", "name"], &[19.into()])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnCountMismatch {
                expected: 2,
                actual: 1
            }
        ));

        let err = store
            .insert_columns("people", &["age", "height"], &[19.into(), 170.into()])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidColumn { columns, .. } if columns == vec!["height"]));
    }

    #[test]
    fn test_round_trip_ignores_null_fields() {
        let store = people_store();
        let inserted = record([("id", 3.into()), ("name", "Gus".into())]);
        store.insert_record("people", &inserted).unwrap();

        let fetched = store.get_record_by_id("people", 3, None).unwrap().remove(0);
        let non_null: Record = fetched.into_iter().filter(|(_, v)| !v.is_null()).collect();
        assert_eq!(non_null, inserted);
    }

    #[test]
    fn test_get_by_id_with_fields_keeps_id_filter() {
        let store = people_store();
        seed(&store);

        let fields = vec!["name".to_string()];
        let rows = store.get_record_by_id("people", 2, Some(fields.as_slice())).unwrap();
        assert_eq!(rows, vec![record([("name", "Bob".into())])]);
    }

    #[test]
    fn test_get_by_id_missing_row_is_empty() {
        let store = people_store();
        assert!(store.get_record_by_id("people", 99, None).unwrap().is_empty());
    }

    #[test]
    fn test_get_by_id_without_id_column() {
        let store = SchemaAwareStore::open_memory().unwrap();
        store
            .create_table("tags", &[ColumnSpec::new("label", "TEXT")])
            .unwrap();
        let err = store.get_record_by_id("tags", 1, None).unwrap_err();
        assert!(matches!(err, Error::InvalidColumn { columns, .. } if columns == vec!["id"]));
    }

    #[test]
    fn test_search_single_criterion() {
        let store = people_store();
        seed(&store);

        let rows = store
            .search_for_records("people", &[Criterion::parse("age", ">", 30).unwrap()], None)
            .unwrap();
        assert_eq!(names(&rows), HashSet::from(["Bob".to_string(), "Carol".to_string()]));
    }

    #[test]
    fn test_search_criteria_are_anded_in_any_order() {
        let store = people_store();
        seed(&store);

        let older = Criterion::new("age", Operator::Gt, 30);
        let c_names = Criterion::new("name", Operator::Like, "C%");

        let forward = store
            .search_for_records("people", &[older.clone(), c_names.clone()], None)
            .unwrap();
        let reversed = store
            .search_for_records("people", &[c_names, older], None)
            .unwrap();

        assert_eq!(names(&forward), HashSet::from(["Carol".to_string()]));
        assert_eq!(names(&forward), names(&reversed));
    }

    #[test]
    fn test_search_without_criteria_returns_all_rows() {
        let store = people_store();
        seed(&store);
        assert_eq!(store.search_for_records("people", &[], None).unwrap().len(), 4);
    }

    #[test]
    fn test_search_rejects_unknown_fields() {
        let store = people_store();
        let fields = vec!["name".to_string(), "email".to_string()];
        let err = store
            .search_for_records(
                "people",
                &[Criterion::new("height", Operator::Gt, 1)],
                Some(fields.as_slice()),
            )
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidColumn { columns, .. } if columns == vec!["email", "height"])
        );
    }

    #[test]
    fn test_search_values_are_bound_not_spliced() {
        let store = people_store();
        seed(&store);

        let rows = store
            .search_for_records(
                "people",
                &[Criterion::new("name", Operator::Eq, "x' OR '1'='1")],
                None,
            )
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.count_records("people").unwrap(), 4);
    }

    #[test]
    fn test_update_record() {
        let store = people_store();
        seed(&store);

        let affected = store
            .update_record(
                "people",
                &record([("age", 46.into())]),
                &[Criterion::new("name", Operator::Eq, "Bob")],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = store.get_record_by_id("people", 2, None).unwrap();
        assert_eq!(rows[0]["age"], Value::Integer(46));
    }

    #[test]
    fn test_update_requires_changes_and_criteria() {
        let store = people_store();
        seed(&store);

        let err = store
            .update_record("people", &record([("age", 1.into())]), &[])
            .unwrap_err();
        assert!(matches!(err, Error::CriteriaRequired { .. }));

        let err = store
            .update_record("people", &Record::new(), &[Criterion::new("id", Operator::Eq, 1)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = store
            .update_record(
                "people",
                &record([("weight", 1.into())]),
                &[Criterion::new("height", Operator::Eq, 1)],
            )
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidColumn { columns, .. } if columns == vec!["weight", "height"])
        );
    }

    #[test]
    fn test_delete_record() {
        let store = people_store();
        seed(&store);

        let affected = store
            .delete_record("people", &[Criterion::new("age", Operator::Lt, 31)])
            .unwrap();
        assert_eq!(affected, 2);
        assert_eq!(store.count_records("people").unwrap(), 2);

        let err = store.delete_record("people", &[]).unwrap_err();
        assert!(matches!(err, Error::CriteriaRequired { operation: "delete_record" }));
        assert_eq!(store.count_records("people").unwrap(), 2);
    }

    #[test]
    fn test_constraint_violation_passes_through() {
        let store = people_store();
        store
            .insert_record("people", &record([("id", 1.into()), ("name", "A".into())]))
            .unwrap();
        let err = store
            .insert_record("people", &record([("id", 1.into()), ("name", "B".into())]))
            .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_schema_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timecard.db");

        {
            let store = SchemaAwareStore::open(&path).unwrap();
            store
                .create_table("punches", &[ColumnSpec::new("id", "INTEGER PRIMARY KEY")])
                .unwrap();
        }

        let store = SchemaAwareStore::open(&path).unwrap();
        assert_eq!(store.columns("punches").unwrap(), vec!["id"]);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_open_in_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no").join("such").join("dir.db");
        let err = SchemaAwareStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_open_non_database_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "this is definitely not a sqlite database file, honest").unwrap();
        let err = SchemaAwareStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_refresh_picks_up_external_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.db");
        let store = SchemaAwareStore::open(&path).unwrap();

        let other = Connection::open(&path).unwrap();
        other.execute_batch("CREATE TABLE audit (id INTEGER, note TEXT)").unwrap();

        assert!(!store.has_table("audit").unwrap());
        store.refresh_schema().unwrap();
        assert_eq!(store.columns("audit").unwrap(), vec!["id", "note"]);
    }

    #[test]
    fn test_lock_timeout() {
        let store = SchemaAwareStore {
            lock_timeout: Duration::from_millis(20),
            ..SchemaAwareStore::open_memory().unwrap()
        };

        let _held = store.lock().unwrap();
        let err = store.has_table("people").unwrap_err();
        assert!(matches!(err, Error::LockTimeout { .. }));
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_updates() {
        let store = Arc::new(people_store());
        let writers = 4;
        let per_writer = 25;

        let mut handles = Vec::new();
        for w in 0..writers {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..per_writer {
                    store
                        .insert_record(
                            "people",
                            &record([("name", format!("w{w}-{i}").into()), ("age", 40.into())]),
                        )
                        .unwrap();
                }
            }));
        }

        let ddl_store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for t in 0..10 {
                ddl_store
                    .create_table(&format!("scratch_{t}"), &[ColumnSpec::new("v", "TEXT")])
                    .unwrap();
            }
        }));

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count_records("people").unwrap(), writers * per_writer);
        let schema = store.schema().unwrap();
        assert_eq!(schema.len(), 11);
        assert!((0..10).all(|t| schema.contains(&format!("scratch_{t}"))));
    }
}
