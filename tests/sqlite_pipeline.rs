use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tempfile::tempdir;

use bugtriage::constants::vocabularies::PRODUCT;
use bugtriage::{
    BugSource, DatasetLoader, LoaderConfig, PipelineError, SplitLabel, SplitRatios, SqliteSource,
    Target, Value, load,
};

const CREATE_FINAL: &str = "CREATE TABLE final (
    assigned_to_init TEXT, cc_init TEXT, product_init TEXT, version_init TEXT,
    component_init TEXT, op_sys_init TEXT, reporter_bug_cnt INTEGER,
    desc_init TEXT, short_desc_init TEXT, priority_final TEXT, severity_final TEXT
)";

/// Row `i` carries `reporter_bug_cnt = i` so split rows can be traced back.
fn seed_database(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("bugs.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(CREATE_FINAL).unwrap();
    let products = ["opera", "core", "firefox", "thunderbird"];
    let severities = ["critical", "normal", "major", "enhancement", "blocker"];
    let priorities = ["P1", "--", "P2", ""];
    for i in 0..rows {
        conn.execute(
            "INSERT INTO final VALUES (?1, ?2, ?3, ?4, 'General', 'Linux', ?5, ?6, ?7, ?8, ?9)",
            params![
                if i % 3 == 0 { "" } else { "dev@example.com" },
                "a@x.com,b@y.com",
                products[i % products.len()],
                if i % 2 == 0 { "trunk" } else { "9.9" },
                i as i64,
                "crash on   startup\twith profile",
                "crash",
                priorities[i % priorities.len()],
                severities[i % severities.len()],
            ],
        )
        .unwrap();
    }
    path
}

fn cell(split: &bugtriage::TrainTestSplit, column: &str, row: usize) -> i64 {
    split
        .x_train
        .value(column, row)
        .and_then(Value::as_integer)
        .unwrap()
}

#[test]
fn severity_split_from_sqlite() {
    let dir = tempdir().unwrap();
    let source = SqliteSource::new(seed_database(dir.path(), 50));
    let split = load(&source, Target::Severity, None).unwrap();

    // 20 of 50 rows are "normal" or "enhancement".
    assert_eq!(split.len(SplitLabel::Train) + split.len(SplitLabel::Test), 30);
    assert_eq!(split.len(SplitLabel::Test), 8);
    for label in split.y_train.iter().chain(&split.y_test) {
        let label = label.as_text().unwrap();
        assert!(label != "normal" && label != "enhancement");
    }

    let names = split.feature_names();
    for dropped in [
        "severity_final",
        "priority_final",
        "assigned_to_init",
        "cc_init",
        "product_init",
        "version_init",
    ] {
        assert!(!names.iter().any(|name| name == dropped), "{dropped} kept");
    }
    assert_eq!(split.x_test.n_columns(), names.len());
}

#[test]
fn derived_features_match_raw_rows() {
    let dir = tempdir().unwrap();
    let source = SqliteSource::new(seed_database(dir.path(), 20));
    let split = load(&source, Target::Priority, None).unwrap();

    for row in 0..split.len(SplitLabel::Train) {
        let id = cell(&split, "reporter_bug_cnt", row) as usize;
        assert_eq!(cell(&split, "cc_init_cnt", row), 2);
        assert_eq!(
            cell(&split, "assigned_to_init_bool", row),
            i64::from(id % 3 != 0)
        );
        assert_eq!(cell(&split, "desc_init_wordcnt", row), 5);
        assert_eq!(cell(&split, "short_desc_init_wordcnt", row), 1);

        let product_hot: i64 = PRODUCT
            .iter()
            .map(|member| cell(&split, &format!("product_init_{member}"), row))
            .sum();
        assert_eq!(product_hot, 1);
        let expected_product = ["other", "core", "firefox", "thunderbird"][id % 4];
        assert_eq!(
            cell(&split, &format!("product_init_{expected_product}"), row),
            1
        );

        let expected_version = if id % 2 == 0 { "trunk" } else { "other" };
        assert_eq!(
            cell(&split, &format!("version_init_{expected_version}"), row),
            1
        );
    }
}

#[test]
fn limit_and_seed_are_honored() {
    let dir = tempdir().unwrap();
    let source = SqliteSource::new(seed_database(dir.path(), 40));

    let limited = load(&source, Target::Priority, Some(12)).unwrap();
    // Rows 0..12 with "--" or "" priorities are dropped.
    assert_eq!(
        limited.len(SplitLabel::Train) + limited.len(SplitLabel::Test),
        6
    );

    let first = load(&source, Target::Severity, None).unwrap();
    let again = load(&source, Target::Severity, None).unwrap();
    assert_eq!(first, again);
    assert_eq!(first.fingerprint(), again.fingerprint());

    let config = LoaderConfig {
        seed: 7,
        ..LoaderConfig::for_target(Target::Severity, None)
    };
    let reseeded = DatasetLoader::new(&source, config).unwrap().load().unwrap();
    assert_ne!(first.y_test, reseeded.y_test);
}

#[test]
fn custom_ratios_change_partition_sizes() {
    let dir = tempdir().unwrap();
    let source = SqliteSource::new(seed_database(dir.path(), 50));
    let config = LoaderConfig {
        split: SplitRatios {
            train: 0.5,
            test: 0.5,
        },
        ..LoaderConfig::default()
    };
    let split = DatasetLoader::new(&source, config).unwrap().load().unwrap();
    assert_eq!(split.len(SplitLabel::Test), 15);
    assert_eq!(split.len(SplitLabel::Train), 15);
}

#[test]
fn unreachable_database_surfaces_connection_error() {
    let dir = tempdir().unwrap();
    let source = SqliteSource::new(dir.path().join("missing").join("bugs.db"));
    let err = load(&source, Target::Severity, None).unwrap_err();
    assert!(matches!(err, PipelineError::Connection { .. }));
    assert!(source.reported_record_count().is_err());
}

#[test]
fn split_export_is_readable_json() {
    let dir = tempdir().unwrap();
    let source = SqliteSource::new(seed_database(dir.path(), 10));
    let split = load(&source, Target::Severity, None).unwrap();
    let out = dir.path().join("out").join("split.json");
    split.write_json(&out, Target::Severity.name(), 42).unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(parsed["target"], "severity_final");
    assert_eq!(parsed["fingerprint"], split.fingerprint());
    assert!(parsed["generated_at"].is_string());
}
