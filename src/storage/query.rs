//! SQL statement construction.
//!
//! Identifiers are composed into the statement text; every data value is
//! returned alongside as a bind parameter. Callers validate identifiers
//! against the [`SchemaCache`](super::SchemaCache) before building.

use crate::error::Error;
use crate::storage::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator allowed in a WHERE condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "NOT LIKE")]
    NotLike,
    #[serde(rename = "GLOB")]
    Glob,
    #[serde(rename = "IS")]
    Is,
    #[serde(rename = "IS NOT")]
    IsNot,
}

impl Operator {
    pub const ALL: [Self; 11] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Like,
        Self::NotLike,
        Self::Glob,
        Self::Is,
        Self::IsNot,
    ];

    /// SQL spelling.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Glob => "GLOB",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = Error;

    /// Parse the SQL spelling, case-insensitive, tolerating extra spaces
    /// (`"not   like"`) and `<>` for `!=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        if normalized == "<>" {
            return Ok(Self::Ne);
        }
        if normalized == "==" {
            return Ok(Self::Eq);
        }
        Self::ALL
            .into_iter()
            .find(|op| op.as_sql() == normalized)
            .ok_or_else(|| Error::InvalidOperator(s.to_string()))
    }
}

/// One `<field> <op> ?` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Criterion {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Build from a string operator, e.g. `Criterion::parse("age", ">", 30)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperator`] if `op` is not a known operator.
    pub fn parse(field: impl Into<String>, op: &str, value: impl Into<Value>) -> Result<Self, Error> {
        Ok(Self::new(field, op.parse()?, value))
    }
}

/// Statement text plus its bind parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Quote an identifier for DML: `"name"`, embedded quotes doubled.
///
/// Names are checked against the schema cache before they get here; quoting
/// keeps reserved words and names with spaces valid SQL.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote_ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn projection(fields: Option<&[String]>) -> String {
    match fields {
        Some(fields) if !fields.is_empty() => quote_list(fields),
        _ => "*".to_string(),
    }
}

/// Append ` WHERE c1 AND c2 ...` (nothing for no criteria).
fn push_where(sql: &mut String, params: &mut Vec<Value>, criteria: &[Criterion]) {
    if criteria.is_empty() {
        return;
    }
    let clauses: Vec<String> = criteria
        .iter()
        .map(|c| format!("{} {} ?", quote_ident(&c.field), c.op))
        .collect();
    sql.push_str(" WHERE ");
    sql.push_str(&clauses.join(" AND "));
    params.extend(criteria.iter().map(|c| c.value.clone()));
}

/// `INSERT INTO t VALUES (?, ...)` or `INSERT INTO t (a, b) VALUES (?, ?)`.
///
/// No columns and no values yields `INSERT INTO t DEFAULT VALUES`.
#[must_use]
pub fn insert(table: &str, columns: Option<&[String]>, values: Vec<Value>) -> Statement {
    let table = quote_ident(table);
    let sql = match columns {
        _ if values.is_empty() => format!("INSERT INTO {table} DEFAULT VALUES"),
        Some(cols) => format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            quote_list(cols),
            placeholders(values.len())
        ),
        None => format!("INSERT INTO {table} VALUES ({})", placeholders(values.len())),
    };
    Statement { sql, params: values }
}

/// `SELECT <fields|*> FROM t [WHERE ...]`.
#[must_use]
pub fn select(table: &str, fields: Option<&[String]>, criteria: &[Criterion]) -> Statement {
    let mut sql = format!("SELECT {} FROM {}", projection(fields), quote_ident(table));
    let mut params = Vec::with_capacity(criteria.len());
    push_where(&mut sql, &mut params, criteria);
    Statement { sql, params }
}

/// `UPDATE t SET a = ?, b = ? [WHERE ...]`.
#[must_use]
pub fn update(table: &str, changes: &[(String, Value)], criteria: &[Criterion]) -> Statement {
    let sets: Vec<String> = changes
        .iter()
        .map(|(col, _)| format!("{} = ?", quote_ident(col)))
        .collect();
    let mut sql = format!("UPDATE {} SET {}", quote_ident(table), sets.join(", "));
    let mut params: Vec<Value> = changes.iter().map(|(_, v)| v.clone()).collect();
    push_where(&mut sql, &mut params, criteria);
    Statement { sql, params }
}

/// `DELETE FROM t [WHERE ...]`.
#[must_use]
pub fn delete(table: &str, criteria: &[Criterion]) -> Statement {
    let mut sql = format!("DELETE FROM {}", quote_ident(table));
    let mut params = Vec::with_capacity(criteria.len());
    push_where(&mut sql, &mut params, criteria);
    Statement { sql, params }
}
