/// Column names of the raw `final` relation and the derived feature columns.
pub mod columns {
    /// Assignee at report time; empty when unassigned.
    pub const ASSIGNED_TO_INIT: &str = "assigned_to_init";
    /// CC list at report time.
    pub const CC_INIT: &str = "cc_init";
    /// Product at report time.
    pub const PRODUCT_INIT: &str = "product_init";
    /// Version at report time.
    pub const VERSION_INIT: &str = "version_init";
    /// Component at report time.
    pub const COMPONENT_INIT: &str = "component_init";
    /// Operating system at report time.
    pub const OP_SYS_INIT: &str = "op_sys_init";
    /// Number of bugs filed by the reporter.
    pub const REPORTER_BUG_CNT: &str = "reporter_bug_cnt";
    /// Initial long description.
    pub const DESC_INIT: &str = "desc_init";
    /// Initial summary line.
    pub const SHORT_DESC_INIT: &str = "short_desc_init";
    /// Final priority label.
    pub const PRIORITY_FINAL: &str = "priority_final";
    /// Final severity label.
    pub const SEVERITY_FINAL: &str = "severity_final";

    /// Column list selected from the `final` relation, in query order.
    pub const RECORD_COLUMNS: [&str; 11] = [
        ASSIGNED_TO_INIT,
        CC_INIT,
        PRODUCT_INIT,
        VERSION_INIT,
        COMPONENT_INIT,
        OP_SYS_INIT,
        REPORTER_BUG_CNT,
        DESC_INIT,
        SHORT_DESC_INIT,
        PRIORITY_FINAL,
        SEVERITY_FINAL,
    ];

    /// Suffix of the assignee presence flag.
    pub const BOOL_SUFFIX: &str = "_bool";
    /// Suffix of the CC address count.
    pub const COUNT_SUFFIX: &str = "_cnt";
    /// Suffix of whitespace token counts.
    pub const WORD_COUNT_SUFFIX: &str = "_wordcnt";
    /// Separator between a source column and a vocabulary member in one-hot names.
    pub const ONE_HOT_SEPARATOR: &str = "_";
}

/// Closed vocabularies used by the one-hot encoders.
pub mod vocabularies {
    /// Catch-all member every vocabulary must contain.
    pub const OTHER: &str = "other";

    /// Products kept as distinct categories.
    pub const PRODUCT: [&str; 8] = [
        OTHER,
        "core",
        "firefox",
        "thunderbird",
        "bugzilla",
        "browser",
        "webtools",
        "psm",
    ];

    /// Versions kept as distinct categories.
    pub const VERSION: [&str; 6] = [
        OTHER,
        "trunk",
        "unspecified",
        "other branch",
        "2.0 branch",
        "1.0 branch",
    ];
}

/// Label sentinels treated as "unlabeled" for each target.
pub mod targets {
    /// Wire name of the severity target.
    pub const SEVERITY_NAME: &str = "severity_final";
    /// Wire name of the priority target.
    pub const PRIORITY_NAME: &str = "priority_final";
    /// Severity values excluded from training data.
    pub const SEVERITY_SENTINELS: [&str; 2] = ["enhancement", "normal"];
    /// Priority values excluded from training data.
    pub const PRIORITY_SENTINELS: [&str; 2] = ["", "--"];
}

/// Train/test partition defaults.
pub mod splits {
    /// Fraction of rows assigned to the training partition.
    pub const DEFAULT_TRAIN_RATIO: f32 = 0.75;
    /// Fraction of rows assigned to the test partition.
    pub const DEFAULT_TEST_RATIO: f32 = 0.25;
    /// Seed used for the partition shuffle.
    pub const DEFAULT_SEED: u64 = 42;
    /// Tolerance used when checking that split ratios sum to one.
    pub const RATIO_EPSILON: f32 = 1e-6;
}

/// Persistence-layer names and defaults.
pub mod store {
    /// Relation holding one denormalized row per bug report.
    pub const FINAL_TABLE: &str = "final";
    /// Table holding one row per opened report.
    pub const REPORTS_TABLE: &str = "reports";
    /// Default database file used by the CLI.
    pub const DEFAULT_DB_PATH: &str = "bugs.db";
    /// Maximum length of the status and resolution columns in `reports`.
    pub const STATUS_MAX_LEN: usize = 50;
}
