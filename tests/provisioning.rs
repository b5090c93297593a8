use rusqlite::Connection;
use tempfile::tempdir;

use bugtriage::cli::run_bug_dataset;
use bugtriage::{PipelineError, SqliteSource};

fn tables(path: &std::path::Path) -> Vec<String> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn provision_creates_database_and_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.db");
    let source = SqliteSource::new(&path);
    source.provision(&["assigned_to", "cc"]).unwrap();
    source.provision(&["cc", "severity"]).unwrap();
    assert_eq!(tables(&path), vec!["assigned_to", "cc", "reports", "severity"]);
}

#[test]
fn provision_rejects_unsafe_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.db");
    let err = SqliteSource::new(&path)
        .provision(&["cc\"; DROP TABLE reports; --"])
        .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
    assert!(tables(&path).is_empty());
}

#[test]
fn cli_provision_only_skips_loading() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cli.db");
    let args = [
        "--db".to_string(),
        path.display().to_string(),
        "--provision-table".to_string(),
        "cc".to_string(),
        "--provision-only".to_string(),
    ];
    run_bug_dataset(args.into_iter()).unwrap();
    // No `final` table exists, so a load would have failed.
    assert_eq!(tables(&path), vec!["cc", "reports"]);
}

#[test]
fn cli_loads_and_exports_split() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cli.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE final (
            assigned_to_init TEXT, cc_init TEXT, product_init TEXT, version_init TEXT,
            component_init TEXT, op_sys_init TEXT, reporter_bug_cnt INTEGER,
            desc_init TEXT, short_desc_init TEXT, priority_final TEXT, severity_final TEXT
        );
        INSERT INTO final VALUES ('', 'a@x', 'core', 'trunk', 'c', 'os', 1, 'a b', 'a', 'P1', 'critical');
        INSERT INTO final VALUES ('d', '', 'opera', '1.0', 'c', 'os', 2, 'a', 'a', '--', 'normal');
        INSERT INTO final VALUES ('d', '', 'psm', '1.0', 'c', 'os', 3, 'a', 'a', 'P2', 'minor');",
    )
    .unwrap();
    drop(conn);

    let output = dir.path().join("split.json");
    let args = [
        "--db".to_string(),
        path.display().to_string(),
        "--target".to_string(),
        "priority_final".to_string(),
        "--output".to_string(),
        output.display().to_string(),
    ];
    run_bug_dataset(args.into_iter()).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(parsed["target"], "priority_final");
    let test_rows = parsed["split"]["y_test"].as_array().unwrap().len();
    let train_rows = parsed["split"]["y_train"].as_array().unwrap().len();
    assert_eq!((train_rows, test_rows), (1, 1));
}
