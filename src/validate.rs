//! Input validation for callers of the store.
//!
//! The store writes table names, column names and DDL types into SQL
//! verbatim, so anything user-supplied goes through here first. Operator
//! spelling gets the same three-tier resolution as elsewhere in the CLI:
//! exact match → synonym lookup → error with suggestion.

use crate::error::{Error, Result};
use crate::storage::{ColumnSpec, Criterion, Operator, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ── Identifiers ──────────────────────────────────────────────

/// Check that `name` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] otherwise.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

/// Words allowed in a column's type and constraint clause.
///
/// Anything else (quotes, semicolons, parentheses, comments) is rejected so a
/// column spec cannot smuggle a second statement into the DDL. A `-` is only
/// accepted as the sign of a number, as in `DEFAULT -1`.
fn is_ddl_word(word: &str) -> bool {
    let body = match word.strip_prefix('-') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        Some(_) => return false,
        None => word,
    };
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Parse `"<name> <type> [options...]"` into a [`ColumnSpec`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the type is missing, or
/// [`Error::InvalidIdentifier`] for an unsafe name, type or option word.
pub fn parse_column_spec(input: &str) -> Result<ColumnSpec> {
    let mut words = input.split_whitespace();
    let name = words
        .next()
        .ok_or_else(|| Error::InvalidArgument("empty column definition".to_string()))?;
    let sql_type = words.next().ok_or_else(|| {
        Error::InvalidArgument(format!("column '{name}' needs a type, e.g. \"{name} TEXT\""))
    })?;
    validate_identifier(name)?;

    let rest: Vec<&str> = words.collect();
    for word in std::iter::once(sql_type).chain(rest.iter().copied()) {
        if !is_ddl_word(word) {
            return Err(Error::InvalidIdentifier(word.to_string()));
        }
    }

    let spec = ColumnSpec::new(name, sql_type);
    Ok(if rest.is_empty() {
        spec
    } else {
        spec.with_options(rest.join(" "))
    })
}

// ── Operators ────────────────────────────────────────────────

pub static OPERATOR_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("eq", "="),
        ("equals", "="),
        ("is_eq", "="),
        ("ne", "!="),
        ("neq", "!="),
        ("not", "!="),
        ("gt", ">"),
        ("above", ">"),
        ("gte", ">="),
        ("ge", ">="),
        ("lt", "<"),
        ("below", "<"),
        ("lte", "<="),
        ("le", "<="),
        ("like", "LIKE"),
        ("matches", "LIKE"),
        ("unlike", "NOT LIKE"),
        ("not_like", "NOT LIKE"),
        ("glob", "GLOB"),
        ("is", "IS"),
        ("is_not", "IS NOT"),
    ]
    .into_iter()
    .collect()
});

static VALID_OPERATORS: LazyLock<HashSet<&str>> =
    LazyLock::new(|| Operator::ALL.iter().map(Operator::as_sql).collect());

/// Normalize an operator via exact SQL spelling or synonym lookup.
///
/// Returns the operator, or an error with the original input and an
/// optional suggestion.
pub fn normalize_operator(input: &str) -> std::result::Result<Operator, (String, Option<String>)> {
    // Tier 1: exact SQL spelling
    if let Ok(op) = input.parse::<Operator>() {
        return Ok(op);
    }

    // Tier 2: synonym lookup
    let lower = input.trim().to_lowercase();
    if let Some(op) = OPERATOR_SYNONYMS
        .get(lower.as_str())
        .and_then(|sql| sql.parse::<Operator>().ok())
    {
        return Ok(op);
    }

    // Tier 3: closest suggestion
    let suggestion = find_closest_match(&lower, &VALID_OPERATORS, &OPERATOR_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Parse a CLI condition `"<field> <op> <value>"`.
///
/// The operator may be one or two words (`NOT LIKE`, `IS NOT`) or a
/// synonym. The value is read as a JSON scalar when it parses as one
/// (`30`, `2.5`, `null`, `"quoted"`), otherwise as bare text.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for a malformed condition,
/// [`Error::InvalidIdentifier`] for an unsafe field name, or
/// [`Error::InvalidOperator`] with a suggestion.
pub fn parse_condition(input: &str) -> Result<Criterion> {
    let malformed = || {
        Error::InvalidArgument(format!(
            "condition '{input}' must look like \"<field> <op> <value>\""
        ))
    };

    let trimmed = input.trim();
    let (field, rest) = trimmed.split_once(char::is_whitespace).ok_or_else(malformed)?;
    validate_identifier(field)?;
    let rest = rest.trim_start();

    // Prefer a two-word operator when one matches.
    let words: Vec<&str> = rest.splitn(3, char::is_whitespace).collect();
    if words.len() == 3 {
        let pair = format!("{} {}", words[0], words[1]);
        if let Ok(op) = pair.parse::<Operator>() {
            return Ok(Criterion::new(field, op, parse_value(words[2])));
        }
    }

    let (op, value) = rest.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let op = normalize_operator(op).map_err(|(raw, suggestion)| match suggestion {
        Some(s) => Error::InvalidOperator(format!("{raw} (did you mean: {s}?)")),
        None => Error::InvalidOperator(raw),
    })?;
    Ok(Criterion::new(field, op, parse_value(value)))
}

/// Read a CLI value: JSON scalar if it parses as one, else the raw text.
#[must_use]
pub fn parse_value(input: &str) -> Value {
    let input = input.trim();
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Blob(_)) | Err(_) => Value::Text(input.to_string()),
        Ok(v) => v,
    }
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, &v.to_lowercase());
        // For synonyms, show what it maps to
        let shown = synonyms.get(v).copied().unwrap_or(v);
        // Ties resolve alphabetically so suggestions don't depend on hash order.
        if dist <= 2 && best.is_none_or(|(b, d)| dist < d || (dist == d && shown < b)) {
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing names similar to the searched one.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}
