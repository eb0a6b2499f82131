//! botdetect CLI: train, evaluate and apply bot-account classifiers.

mod error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use botdetect::data::RowErrorPolicy;
use botdetect::features::{layout_width, RawRecord, ID_COLUMN, SCREEN_NAME_COLUMN};
use botdetect::model::{ModelKind, TrainedModel};
use botdetect::pipeline::{Detector, ModelReport, Pipeline, PipelineConfig};
use botdetect::preprocessing::MinMaxScaler;
use botdetect::serialization::{export, import};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

#[derive(Parser)]
#[command(name = "botdetect")]
#[command(about = "Behavioral bot-account detection")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the commands that assemble a training set.
#[derive(Args)]
struct TrainingArgs {
    /// Labeled account CSV (must contain a `bot` column)
    #[arg(short, long)]
    input: PathBuf,

    /// JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append the screen-name and description token flags
    #[arg(long)]
    token_flags: bool,

    /// Number of forest trees (overrides the config)
    #[arg(long)]
    trees: Option<usize>,

    /// Skip unparseable rows instead of aborting
    #[arg(long)]
    skip_bad_rows: bool,
}

impl TrainingArgs {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(existing(path)?)?,
            None => PipelineConfig::new(),
        };
        if self.token_flags {
            config = config.with_token_flags(true);
        }
        if let Some(n) = self.trees {
            config = config.with_n_trees(n);
        }
        if self.skip_bad_rows {
            config = config.with_row_errors(RowErrorPolicy::Skip);
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train every configured model on a split and report held-out metrics
    Evaluate {
        #[command(flatten)]
        training: TrainingArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train one model on the full balanced set and export it
    Train {
        #[command(flatten)]
        training: TrainingArgs,

        /// Model kind (bayesian, tree, forest)
        #[arg(short, long, default_value = "forest")]
        kind: ModelKind,

        /// Output model file
        #[arg(short, long, default_value = "model.bin")]
        output: PathBuf,

        /// Output scaler file (defaults to the model path with a `.scaler` extension)
        #[arg(short, long)]
        scaler: Option<PathBuf>,
    },

    /// Classify unlabeled accounts with an exported model and scaler
    Predict {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// Fitted scaler file
        #[arg(short, long)]
        scaler: PathBuf,

        /// Account CSV to classify
        #[arg(short, long)]
        input: PathBuf,

        /// JSON pipeline configuration (vocabulary and token flags).
        /// Defaults to the `.config.json` file written next to the model by
        /// `train`; without one, the default vocabulary is used and only the
        /// token-flag layout is inferred from the scaler.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Evaluate { training, json } => cmd_evaluate(&training, json),
        Commands::Train {
            training,
            kind,
            output,
            scaler,
        } => {
            let scaler = scaler.unwrap_or_else(|| output.with_extension("scaler"));
            cmd_train(&training, kind, &output, &scaler)
        }
        Commands::Predict {
            model,
            scaler,
            input,
            config,
        } => cmd_predict(&model, &scaler, &input, config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Pipeline config saved next to a model file.
fn config_sidecar(model: &Path) -> PathBuf {
    model.with_extension("config.json")
}

fn existing(path: &Path) -> Result<&Path> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(CliError::FileNotFound(path.to_path_buf()))
    }
}

/// Reads a headed CSV file into one record per row.
fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(existing(path)?)?;
    let headers = reader.headers()?.clone();
    let records = reader
        .records()
        .map(|row| -> Result<RawRecord> {
            let row = row?;
            Ok(headers.iter().zip(row.iter()).collect())
        })
        .collect::<Result<Vec<RawRecord>>>()?;
    tracing::debug!(path = %path.display(), rows = records.len(), "read input");
    Ok(records)
}

#[derive(Serialize)]
struct EvaluateSummary<'a> {
    bots_seen: usize,
    humans_seen: usize,
    skipped: usize,
    n_train: usize,
    n_test: usize,
    models: &'a [ModelReport],
}

fn cmd_evaluate(training: &TrainingArgs, json: bool) -> Result<()> {
    let config = training.pipeline_config()?;
    let records = read_records(&training.input)?;
    let report = Pipeline::new(config).run(&records)?;

    if json {
        let summary = EvaluateSummary {
            bots_seen: report.bots_seen,
            humans_seen: report.humans_seen,
            skipped: report.skipped,
            n_train: report.n_train,
            n_test: report.n_test,
            models: &report.reports,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Rows: {} bot, {} non-bot, {} skipped",
        report.bots_seen, report.humans_seen, report.skipped
    );
    println!("Split: {} train, {} test", report.n_train, report.n_test);
    println!();
    println!("{:<10} {:>9} {:>8}", "model", "accuracy", "auc");
    for ModelReport { kind, evaluation } in &report.reports {
        let auc = evaluation
            .auc
            .map_or_else(|| "n/a".to_string(), |a| format!("{a:.4}"));
        println!("{:<10} {:>9.4} {:>8}", kind.as_str(), evaluation.accuracy, auc);
    }
    Ok(())
}

fn cmd_train(training: &TrainingArgs, kind: ModelKind, output: &Path, scaler: &Path) -> Result<()> {
    let config = training.pipeline_config()?;
    let records = read_records(&training.input)?;
    let detector = Pipeline::new(config.clone()).train_detector(&records, kind)?;

    export(detector.model(), output)?;
    export(detector.scaler(), scaler)?;
    let sidecar = config_sidecar(output);
    fs::write(&sidecar, serde_json::to_string_pretty(&config)?)?;

    println!("Trained {kind} model on {} columns", detector.builder().width());
    println!("Model:  {}", output.display());
    println!("Scaler: {}", scaler.display());
    println!("Config: {}", sidecar.display());
    Ok(())
}

fn cmd_predict(model_path: &Path, scaler: &Path, input: &Path, config: Option<&Path>) -> Result<()> {
    let model: TrainedModel = import(existing(model_path)?)?;
    let scaler: MinMaxScaler = import(existing(scaler)?)?;

    let sidecar = config_sidecar(model_path);
    let config = match config {
        Some(path) => PipelineConfig::from_json_file(existing(path)?)?,
        None if sidecar.is_file() => {
            tracing::info!(path = %sidecar.display(), "using saved pipeline config");
            PipelineConfig::from_json_file(&sidecar)?
        }
        None => {
            // Layout follows the exported scaler; the vocabulary is the default.
            let width = scaler.data_min().map_or(0, <[f32]>::len);
            tracing::warn!(width, "no pipeline config found, assuming the default vocabulary");
            PipelineConfig::new().with_token_flags(width == layout_width(true))
        }
    };

    let detector = Detector::new(config.feature_builder(), scaler, model)?;
    let records = read_records(input)?;
    let predictions = detector.predict(&records)?;

    let mut out = csv::Writer::from_writer(io::stdout().lock());
    out.write_record([ID_COLUMN, SCREEN_NAME_COLUMN, "prediction"])?;
    for (record, label) in records.iter().zip(&predictions) {
        let label = label.to_string();
        out.write_record([
            record.get(ID_COLUMN).unwrap_or_default(),
            record.get(SCREEN_NAME_COLUMN).unwrap_or_default(),
            label.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}
