//! End-to-end tests: configuration file -> janitor -> SQLite cleaner

use rusqlite::{params, Connection};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tidemark_domain::SessionFactory;
use tidemark_janitor::{Janitor, JanitorConfig, JanitorError, RunOutcome, SkipReason};
use tidemark_store::{SqliteCleaner, SqliteSessionFactory, TableTarget};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as i64
}

fn write_config(dir: &tempfile::TempDir, policy: &str) -> std::path::PathBuf {
    let db = dir.path().join("history.db");
    let text = format!(
        r#"
database_url = "jdbc:sqlite:{db}"

[[datasets]]
name = "positions"
table = "position_log"
timestamp_column = "recorded_at"
size_column = "payload_size"
batch_rows = 2

[datasets.policy]
{policy}
"#,
        db = db.display(),
        policy = policy,
    );

    let path = dir.path().join("tidemark.toml");
    std::fs::write(&path, text).unwrap();
    path
}

fn seed(conn: &Connection, ages_days: &[i64]) {
    conn.execute_batch(
        "CREATE TABLE position_log (
            id INTEGER PRIMARY KEY,
            recorded_at INTEGER NOT NULL,
            payload_size INTEGER NOT NULL
        )",
    )
    .unwrap();
    let now = now_ms();
    for age in ages_days {
        conn.execute(
            "INSERT INTO position_log (recorded_at, payload_size) VALUES (?1, ?2)",
            params![now - age * DAY_MS, 1024],
        )
        .unwrap();
    }
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM position_log", [], |row| row.get(0))
        .unwrap()
}

fn build(path: &std::path::Path) -> (Janitor<SqliteSessionFactory, TableTarget>, SqliteSessionFactory) {
    let config: JanitorConfig<TableTarget> = JanitorConfig::from_file(path).unwrap();
    let factory = SqliteSessionFactory::from_url(&config.database_url).unwrap();
    let janitor = Janitor::from_config(factory.clone(), &config, Arc::new(SqliteCleaner::new()));
    (janitor, factory)
}

#[test]
fn test_keep_days_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"kind = "time_window"
enabled = true
cron = "0 0 * * * ?"
keep_days = 30"#,
    );
    let (janitor, factory) = build(&path);

    let conn = factory.open().unwrap();
    seed(&conn, &[45, 40, 35, 31, 29, 1]);

    let outcome = janitor.fire("positions").unwrap();
    match outcome {
        RunOutcome::Completed(report) => assert_eq!(report.rows_deleted, 4),
        other => panic!("Expected completed run, got {:?}", other),
    }
    assert_eq!(count(&conn), 2);

    // Idempotent
    match janitor.fire("positions").unwrap() {
        RunOutcome::Completed(report) => assert_eq!(report.rows_deleted, 0),
        other => panic!("Expected completed run, got {:?}", other),
    }
    assert_eq!(janitor.metrics().dataset("positions").unwrap().runs, 2);
}

#[test]
fn test_legacy_quota_fields_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"kind = "quota"
enabled = true
cron = "0 */5 * * * ?"
quotaInM = 1
deleteInM = 1"#,
    );
    let (janitor, factory) = build(&path);

    let conn = factory.open().unwrap();
    // 2048 rows of 1 KiB = 2 MiB
    seed(&conn, &vec![1; 2048]);

    match janitor.fire("positions").unwrap() {
        RunOutcome::Completed(report) => {
            assert_eq!(report.rows_deleted, 1024);
            assert_eq!(report.bytes_freed, Some(1024 * 1024));
        }
        other => panic!("Expected completed run, got {:?}", other),
    }
    assert_eq!(count(&conn), 1024);
}

#[test]
fn test_invalid_policy_is_never_executed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"kind = "time_window"
enabled = true
cron = ""
keep_days = -1"#,
    );
    let (janitor, factory) = build(&path);

    let conn = factory.open().unwrap();
    seed(&conn, &[100]);

    assert_eq!(
        janitor.fire("positions").unwrap(),
        RunOutcome::Skipped(SkipReason::Invalid(vec!["cron".into(), "keepDays".into()]))
    );
    assert_eq!(count(&conn), 1);
}

#[test]
fn test_missing_table_reports_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"kind = "time_window"
enabled = true
cron = "0 0 * * * ?"
keep_minutes = 5"#,
    );
    let (janitor, _factory) = build(&path);

    let err = janitor.fire("positions").unwrap_err();
    assert!(matches!(err, JanitorError::Execution { ref dataset, .. } if dataset == "positions"));
    assert_eq!(janitor.metrics().total_failures(), 1);
}
