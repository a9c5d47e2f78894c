//! Configuration management.
//!
//! Resolves the database path and store timeouts from CLI flags,
//! environment variables, and built-in defaults.
//!
//! | Setting | Flag | Environment | Default |
//! |---|---|---|---|
//! | Database file | `--db` | `TIMECARD_DB` | `timecard.db` |
//! | Lock timeout | | `TIMECARD_LOCK_TIMEOUT_MS` | 30000 |
//! | Busy timeout | | `TIMECARD_BUSY_TIMEOUT_MS` | 5000 |

use crate::error::{Error, Result};
use crate::storage::StoreOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Database file used when nothing else is configured.
pub const DEFAULT_DB_FILE: &str = "timecard.db";

pub const DB_ENV: &str = "TIMECARD_DB";
pub const LOCK_TIMEOUT_ENV: &str = "TIMECARD_LOCK_TIMEOUT_MS";
pub const BUSY_TIMEOUT_ENV: &str = "TIMECARD_BUSY_TIMEOUT_MS";

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `TIMECARD_DB` environment variable
/// 3. `timecard.db` in the current directory
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit_path {
        return path.to_path_buf();
    }

    if let Ok(db_path) = std::env::var(DB_ENV) {
        if !db_path.trim().is_empty() {
            return PathBuf::from(db_path);
        }
    }

    PathBuf::from(DEFAULT_DB_FILE)
}

/// Parse a millisecond setting; `None` and blank fall back to `default`.
fn parse_millis(name: &str, raw: Option<&str>, default: Duration) -> Result<Duration> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| Error::Config(format!("{name} must be a whole number of milliseconds, got '{s}'"))),
    }
}

/// Store options from the environment, over the defaults.
///
/// # Errors
///
/// Returns [`Error::Config`] if a timeout variable is set but not a number.
pub fn store_options() -> Result<StoreOptions> {
    let defaults = StoreOptions::default();
    let lock = std::env::var(LOCK_TIMEOUT_ENV).ok();
    let busy = std::env::var(BUSY_TIMEOUT_ENV).ok();

    Ok(StoreOptions {
        lock_timeout: parse_millis(LOCK_TIMEOUT_ENV, lock.as_deref(), defaults.lock_timeout)?,
        busy_timeout: parse_millis(BUSY_TIMEOUT_ENV, busy.as_deref(), defaults.busy_timeout)?,
    })
}
