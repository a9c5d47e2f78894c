//! End-to-end tests for the `tc` binary.
//!
//! stdout is not a terminal under the test harness, so every command
//! answers in JSON.

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn tc(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tc").unwrap();
    cmd.arg("--db").arg(db).env_remove("TIMECARD_DB").env_remove("RUST_LOG");
    cmd
}

fn run_json(db: &Path, args: &[&str]) -> Value {
    let output = tc(db).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "tc {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn run_err(db: &Path, args: &[&str]) -> (i32, Value) {
    let output = tc(db).args(args).output().unwrap();
    assert!(!output.status.success(), "tc {args:?} unexpectedly succeeded");
    let err = serde_json::from_slice(&output.stderr).unwrap();
    (output.status.code().unwrap(), err)
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("timecard.db");

    let first = run_json(&db, &["init"]);
    assert_eq!(first["created"], true);
    assert_eq!(first["table"], "timecard");

    let second = run_json(&db, &["init"]);
    assert_eq!(second["created"], false);

    let tables = run_json(&db, &["table", "list"]);
    assert_eq!(tables["count"], 1);
    assert_eq!(tables["tables"][0]["columns"][0], "id");
}

#[test]
fn record_lifecycle() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("people.db");

    run_json(
        &db,
        &[
            "table", "create", "people",
            "--column", "id INTEGER PRIMARY KEY",
            "--column", "name TEXT NOT NULL",
            "--column", "age INTEGER",
        ],
    );

    let inserted = run_json(&db, &["insert", "people", "--record", r#"{"name":"Alice","age":30}"#]);
    assert_eq!(inserted["rows"], 1);
    run_json(&db, &["insert", "people", "--values", r#"[null,"Bob",25]"#]);
    run_json(&db, &["insert", "people", "--values", r#"["Cy"]"#, "--columns", "name"]);

    let got = run_json(&db, &["get", "people", "1"]);
    assert_eq!(got["count"], 1);
    assert_eq!(got["records"][0]["name"], "Alice");

    let older = run_json(&db, &["search", "people", "--where", "age gte 25", "--fields", "name"]);
    assert_eq!(older["count"], 2);
    assert!(older["records"][0].get("age").is_none());

    let updated = run_json(&db, &["update", "people", "--set", r#"{"age":31}"#, "--where", "name = Alice"]);
    assert_eq!(updated["rows"], 1);

    let deleted = run_json(&db, &["delete", "people", "--where", "age is null"]);
    assert_eq!(deleted["rows"], 1);

    let all = run_json(&db, &["search", "people"]);
    assert_eq!(all["count"], 2);
}

#[test]
fn punch_requires_init() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("timecard.db");

    let (code, err) = run_err(&db, &["punch", "in"]);
    assert_eq!(code, 3);
    assert_eq!(err["error"]["code"], "UNKNOWN_TABLE");

    run_json(&db, &["init"]);
    let punched = run_json(&db, &["punch", "in", "--city", "Tulsa"]);
    assert_eq!(punched["in_out_flag"], "I");
    assert_eq!(punched["city"], "Tulsa");

    let pending = run_json(&db, &["search", "timecard", "--where", "timecard_entered_flag = N"]);
    assert_eq!(pending["count"], 1);
}

#[test]
fn validation_errors_map_to_exit_codes() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("timecard.db");
    run_json(&db, &["init"]);

    let (code, err) = run_err(&db, &["search", "timecard", "--where", "nope = 1"]);
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "INVALID_COLUMN");

    let (code, err) = run_err(&db, &["table", "create", "bad;name", "--column", "a TEXT"]);
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "INVALID_IDENTIFIER");

    let (code, _) = run_err(&db, &["search", "timecard", "--where", "city ~~ x"]);
    assert_eq!(code, 4);
}
