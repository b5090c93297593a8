use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};
use tracing::error;

use crate::config::LoaderConfig;
use crate::constants::splits::DEFAULT_SEED;
use crate::constants::store::DEFAULT_DB_PATH;
use crate::loader::DatasetLoader;
use crate::metrics::label_distribution;
use crate::source::SqliteSource;
use crate::splits::{SplitLabel, SplitRatios, TrainTestSplit};
use crate::target::Target;
use crate::{Column, PipelineError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    #[value(name = "severity_final")]
    Severity,
    #[value(name = "priority_final")]
    Priority,
}

impl From<TargetArg> for Target {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Severity => Target::Severity,
            TargetArg::Priority => Target::Priority,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "bug_dataset",
    disable_help_subcommand = true,
    about = "Build a labeled train/test feature set from bug reports",
    long_about = "Read bug reports from the `final` relation, drop unlabeled rows for the chosen target, derive numeric features, and split them into reproducible train and test partitions.",
    after_help = "Set RUST_LOG=info (or debug) to follow each pipeline stage."
)]
/// CLI for `bug_dataset`.
///
/// Common usage:
/// - Severity dataset from `bugs.db`: `bug_dataset`
/// - Priority dataset from the first 10k rows: `bug_dataset --target priority_final --limit 10000`
/// - Create missing history tables only: `bug_dataset --provision-table cc --provision-only`
struct BugDatasetCli {
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_DB_PATH,
        help = "SQLite database holding the `final` relation"
    )]
    db: PathBuf,
    #[arg(
        long,
        value_enum,
        default_value = "severity_final",
        help = "Label column to prepare the dataset for"
    )]
    target: TargetArg,
    #[arg(
        long,
        value_parser = parse_positive_usize,
        help = "Read at most this many rows"
    )]
    limit: Option<usize>,
    #[arg(
        long,
        default_value_t = DEFAULT_SEED,
        help = "Deterministic seed used for the train/test shuffle"
    )]
    seed: u64,
    #[arg(
        long = "split-ratios",
        value_name = "TRAIN,TEST",
        value_parser = parse_split_ratios_arg,
        default_value = "0.75,0.25",
        help = "Comma-separated split ratios that must sum to 1.0"
    )]
    split: SplitRatios,
    #[arg(
        long = "provision-table",
        value_name = "TABLE",
        help = "Ensure `reports` and this history table exist before loading, repeat as needed"
    )]
    provision_tables: Vec<String>,
    #[arg(
        long = "provision-only",
        help = "Provision tables and exit without loading"
    )]
    provision_only: bool,
    #[arg(
        long,
        value_name = "PATH",
        help = "Write the split as JSON to this file"
    )]
    output: Option<PathBuf>,
}

/// Entry point of the `bug_dataset` binary.
///
/// A `PipelineError::Connection` is logged before being returned; callers are
/// expected to exit with a failure status.
pub fn run_bug_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<BugDatasetCli, _>(std::iter::once("bug_dataset".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let source = SqliteSource::new(&cli.db);
    if cli.provision_only || !cli.provision_tables.is_empty() {
        source
            .provision(&cli.provision_tables)
            .inspect_err(report_fatal)?;
        println!(
            "Provisioned reports + {} history table(s) in {}",
            cli.provision_tables.len(),
            cli.db.display()
        );
        if cli.provision_only {
            return Ok(());
        }
    }

    let config = LoaderConfig {
        target: cli.target.into(),
        limit: cli.limit,
        split: cli.split,
        seed: cli.seed,
        ..LoaderConfig::default()
    };
    let loader = DatasetLoader::new(&source, config)?;
    let split = loader.load().inspect_err(report_fatal)?;
    print_summary(loader.config(), &split);

    if let Some(path) = cli.output {
        split.write_json(&path, loader.config().target.name(), cli.seed)?;
        println!("Wrote split to {}", path.display());
    }
    Ok(())
}

fn report_fatal(err: &PipelineError) {
    if let PipelineError::Connection { location, .. } = err {
        error!(location = %location, error = %err, "unable to connect to the database");
    }
}

fn print_summary(config: &LoaderConfig, split: &TrainTestSplit) {
    println!("=== dataset: {} ===", config.target);
    println!("features: {}", split.feature_names().len());
    println!("seed: {}", config.seed);
    println!("fingerprint: {:016x}", split.fingerprint());
    for label in [SplitLabel::Train, SplitLabel::Test] {
        println!("{:?} rows: {}", label, split.len(label));
        print_distribution(split.labels(label));
    }
}

fn print_distribution(labels: &Column) {
    let Some(dist) = label_distribution(labels) else {
        println!("  (no rows)");
        return;
    };
    for share in &dist.per_label {
        println!(
            "  {:<16} {:>8} ({:>5.1}%)",
            share.label,
            share.count,
            share.share * 100.0
        );
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid value '{raw}': must be a positive integer"))?;
    if value == 0 {
        return Err(format!("invalid value '{raw}': must be greater than 0"));
    }
    Ok(value)
}

fn parse_split_ratios_arg(raw: &str) -> Result<SplitRatios, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return Err("--split-ratios expects exactly 2 comma-separated values".to_string());
    }
    let train = parts[0]
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid train ratio '{}': must be a float", parts[0].trim()))?;
    let test = parts[1]
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid test ratio '{}': must be a float", parts[1].trim()))?;
    SplitRatios { train, test }
        .normalized()
        .map_err(|err| err.to_string())
}
