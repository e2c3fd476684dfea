//! CLI integration tests for the Satchel command-line interface.
//!
//! Every test runs the binary against a fresh temporary directory that holds
//! the database, the user config dir and the working directory, so tests
//! never touch real user state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use satchel_session::{ManualClock, SessionStore, SqliteSessionStore, StoreOptions};
use tempfile::TempDir;

/// Get a command for the satchel binary, isolated in `dir`.
fn satchel(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("satchel").unwrap();
    cmd.current_dir(dir)
        .env("SATCHEL_CONFIG_DIR", dir.join("config"))
        .env_remove("SATCHEL_DATABASE")
        .arg("--database")
        .arg(dir.join("sessions.db"));
    cmd
}

fn database(dir: &Path) -> PathBuf {
    dir.join("sessions.db")
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("put"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("gc"))
        .stdout(predicate::str::contains("vars"))
        .stdout(predicate::str::contains("set"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("satchel"));
}

#[test]
fn test_put_requires_value() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path()).args(["put", "s1"]).assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_init_creates_database() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("sessions.db"));
    assert!(database(dir.path()).is_file());
}

#[test]
fn test_put_then_get() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["put", "s1", "hello"])
        .assert()
        .success();

    satchel(dir.path())
        .args(["get", "s1"])
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn test_put_overwrites() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path()).args(["put", "s1", "A"]).assert().success();
    satchel(dir.path()).args(["put", "s1", "B"]).assert().success();

    satchel(dir.path())
        .args(["get", "s1"])
        .assert()
        .success()
        .stdout("B\n");
}

#[test]
fn test_get_missing_fails() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["get", "nobody"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_destroy_then_get() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path()).args(["put", "s2", "X"]).assert().success();
    satchel(dir.path()).args(["destroy", "s2"]).assert().success();
    satchel(dir.path()).args(["destroy", "s2"]).assert().success();

    satchel(dir.path())
        .args(["get", "s2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_inspect_live_record() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["put", "s1", "hello", "--ttl", "3600"])
        .assert()
        .success();

    satchel(dir.path())
        .args(["inspect", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id: s1"))
        .stdout(predicate::str::contains("expired: false"))
        .stdout(predicate::str::contains("bytes: 5"));
}

/// Write a record whose expiry lies far in the past.
fn seed_expired(dir: &Path, id: &str) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());
    let store = SqliteSessionStore::open(database(dir), StoreOptions::default())
        .unwrap()
        .with_clock(Arc::new(clock));
    store.write(id, b"stale").unwrap();
}

#[test]
fn test_expired_record_hidden_from_get_but_inspectable() {
    let dir = TempDir::new().unwrap();
    seed_expired(dir.path(), "old");

    satchel(dir.path())
        .args(["get", "old"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    satchel(dir.path())
        .args(["inspect", "old"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expires_at: 2001-01-01 00:24:00"))
        .stdout(predicate::str::contains("expired: true"));
}

#[test]
fn test_gc_removes_expired() {
    let dir = TempDir::new().unwrap();
    seed_expired(dir.path(), "old");
    satchel(dir.path())
        .args(["put", "fresh", "1"])
        .assert()
        .success();

    satchel(dir.path())
        .arg("gc")
        .assert()
        .success()
        .stdout("removed 1\n");

    satchel(dir.path())
        .args(["get", "fresh"])
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Variable Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_set_then_vars() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["set", "s1", "user", "42"])
        .assert()
        .success();
    satchel(dir.path())
        .args(["set", "s1", "role", "admin"])
        .assert()
        .success();

    satchel(dir.path())
        .args(["vars", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""user": 42"#))
        .stdout(predicate::str::contains(r#""role": "admin""#));
}

#[test]
fn test_vars_of_new_session_is_empty() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["vars", "fresh"])
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn test_vars_does_not_write_record() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["vars", "ghost"])
        .assert()
        .success();

    satchel(dir.path())
        .args(["inspect", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_vars_keeps_existing_expiry() {
    let dir = TempDir::new().unwrap();
    seed_expired(dir.path(), "old");

    satchel(dir.path())
        .args(["vars", "old"])
        .assert()
        .success()
        .stdout("{}\n");

    satchel(dir.path())
        .args(["inspect", "old"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expires_at: 2001-01-01 00:24:00"))
        .stdout(predicate::str::contains("bytes: 5"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_project_config_sets_table() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("satchel.toml"),
        r#"
[database]
table = "web_sessions"
"#,
    )
    .unwrap();

    satchel(dir.path())
        .args(["--verbose", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table web_sessions"))
        .stdout(predicate::str::contains("config ").and(predicate::str::contains("satchel.toml")));
}

#[test]
fn test_init_without_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    satchel(dir.path())
        .args(["--verbose", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table sessions"))
        .stdout(predicate::str::contains("no config files loaded"));
}

#[test]
fn test_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(
        &config,
        r#"
[database]
table = "from_flag"
"#,
    )
    .unwrap();

    satchel(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--verbose", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table from_flag"));
}

#[test]
fn test_invalid_table_name_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("satchel.toml"),
        r#"
[database]
table = "sessions; DROP TABLE users"
"#,
    )
    .unwrap();

    satchel(dir.path()).arg("init").assert().failure();
}
