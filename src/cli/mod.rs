//! Flight monitor CLI module
//!
//! Command-line interface for cleaning, training, monitoring and prediction.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::MonitorConfig;
use crate::ingest::{
    load_schema, save_cleaned, save_schema, schema_path, DataSource, DEFAULT_FETCH_TIMEOUT_SECS,
};
use crate::inference::{ClockTime, FlightInput, PredictionService, RecordEncoder};
use crate::pipeline::{MonitoringPipeline, MonitoringRun};
use crate::preprocessing::FlightPreprocessor;
use crate::report::{HtmlRenderer, ReportKind, ReportRenderer, ReportSelection, TextRenderer};
use crate::schema::{CATEGORICAL_COLUMNS, NUMERICAL_COLUMNS, TARGET_COLUMN};
use crate::training::ModelSelector;
use crate::utils::{column_f64, has_column};
use crate::window::DateRange;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }
fn alert(s: &str) -> ColoredString { s.truecolor(240, 110, 100) }

fn kv(key: &str, val: &str) {
    println!("  {:<22} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_warn(msg: &str) {
    println!("  {} {}", alert("!"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "flight-monitor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Flight arrival-delay prediction with drift and quality monitoring")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a raw batch and write it as CSV
    Clean {
        /// Local path or http(s) URL of the raw batch
        #[arg(short, long)]
        source: String,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Fetch timeout in seconds
        #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Select the best model on a dataset and save it
    Train {
        /// Input data (cleaned CSV unless --raw)
        #[arg(short, long)]
        data: String,

        /// Output model file (JSON)
        #[arg(short, long, default_value = "model.json")]
        output: PathBuf,

        /// Clean the input before training
        #[arg(long)]
        raw: bool,
    },

    /// Run reference/current monitoring on a batch
    Monitor(MonitorArgs),

    /// Predict the arrival delay of one flight
    Predict(PredictArgs),

    /// Show dataset information
    Info {
        /// Local path or http(s) URL
        #[arg(short, long)]
        source: String,
    },
}

#[derive(Args)]
pub struct MonitorArgs {
    /// Local path or http(s) URL of the raw batch
    #[arg(short, long)]
    pub source: Option<String>,

    /// JSON run configuration; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub start_month: Option<u32>,
    #[arg(long)]
    pub end_month: Option<u32>,
    #[arg(long)]
    pub start_day: Option<u32>,
    #[arg(long)]
    pub end_day: Option<u32>,

    /// Model performance report
    #[arg(long)]
    pub performance: bool,
    /// Target drift report
    #[arg(long)]
    pub target_drift: bool,
    /// Data drift report
    #[arg(long)]
    pub data_drift: bool,
    /// Data quality report
    #[arg(long)]
    pub data_quality: bool,

    /// Write all reports as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write all reports as an HTML page
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl MonitorArgs {
    /// Report toggles; none given means every report
    fn selection(&self) -> Option<ReportSelection> {
        let toggles = [
            (self.performance, ReportKind::Performance),
            (self.target_drift, ReportKind::TargetDrift),
            (self.data_drift, ReportKind::DataDrift),
            (self.data_quality, ReportKind::DataQuality),
        ];
        let selection = toggles
            .into_iter()
            .filter(|(on, _)| *on)
            .fold(ReportSelection::none(), |s, (_, kind)| s.with(kind));
        (!selection.is_empty()).then_some(selection)
    }

    fn into_config(self) -> anyhow::Result<(MonitorConfig, Option<PathBuf>, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::from_file(path)?,
            None => MonitorConfig::default(),
        }
        .with_env_overrides();

        if let Some(selection) = self.selection() {
            config.reports = selection;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(secs) = self.timeout {
            config.fetch_timeout_secs = secs;
        }
        let range = &mut config.date_range;
        range.start_month = self.start_month.unwrap_or(range.start_month);
        range.end_month = self.end_month.unwrap_or(range.end_month);
        range.start_day = self.start_day.unwrap_or(range.start_day);
        range.end_day = self.end_day.unwrap_or(range.end_day);

        Ok((config, self.json, self.html))
    }
}

#[derive(Args)]
pub struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    pub model: PathBuf,

    #[arg(long)]
    pub carrier: String,
    #[arg(long)]
    pub origin: String,
    #[arg(long)]
    pub dest: String,

    #[arg(long, default_value_t = 1)]
    pub month: u32,
    #[arg(long, default_value_t = 1)]
    pub day_of_month: u32,
    #[arg(long, default_value_t = 1)]
    pub day_of_week: u32,

    /// Departure time (HH:MM)
    #[arg(long, default_value = "08:00")]
    pub dep_time: ClockTime,
    /// Scheduled departure time (HH:MM)
    #[arg(long, default_value = "08:00")]
    pub crs_dep_time: ClockTime,
    /// Scheduled arrival time (HH:MM)
    #[arg(long, default_value = "08:00")]
    pub crs_arr_time: ClockTime,

    #[arg(long, default_value_t = 1.0)]
    pub flight_num: f64,
    #[arg(long, default_value_t = 120.0)]
    pub crs_elapsed_time: f64,
    #[arg(long, default_value_t = 100.0)]
    pub air_time: f64,
    #[arg(long, default_value_t = 0.0)]
    pub dep_delay: f64,
    #[arg(long, default_value_t = 1000.0)]
    pub distance: f64,
    #[arg(long, default_value_t = 10.0)]
    pub taxi_in: f64,
    #[arg(long, default_value_t = 20.0)]
    pub taxi_out: f64,
    #[arg(long, default_value_t = 0.0)]
    pub carrier_delay: f64,
    #[arg(long, default_value_t = 0.0)]
    pub weather_delay: f64,
    #[arg(long, default_value_t = 0.0)]
    pub nas_delay: f64,
    #[arg(long, default_value_t = 0.0)]
    pub security_delay: f64,
    #[arg(long, default_value_t = 0.0)]
    pub late_aircraft_delay: f64,
}

impl From<PredictArgs> for FlightInput {
    fn from(args: PredictArgs) -> Self {
        FlightInput {
            month: args.month,
            day_of_month: args.day_of_month,
            day_of_week: args.day_of_week,
            dep_time: args.dep_time,
            crs_dep_time: args.crs_dep_time,
            crs_arr_time: args.crs_arr_time,
            flight_num: args.flight_num,
            crs_elapsed_time: args.crs_elapsed_time,
            air_time: args.air_time,
            dep_delay: args.dep_delay,
            distance: args.distance,
            taxi_in: args.taxi_in,
            taxi_out: args.taxi_out,
            carrier_delay: args.carrier_delay,
            weather_delay: args.weather_delay,
            nas_delay: args.nas_delay,
            security_delay: args.security_delay,
            late_aircraft_delay: args.late_aircraft_delay,
            carrier: args.carrier,
            origin: args.origin,
            dest: args.dest,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn fetch(source: &str, timeout_secs: u64) -> anyhow::Result<polars::prelude::DataFrame> {
    let source = DataSource::parse(source);
    step_run(&format!("Fetching {}", source.name()));
    let start = Instant::now();
    let df = source.fetch(Duration::from_secs(timeout_secs))?;
    step_done(&format!(
        "{} rows × {} cols in {:.2}s",
        df.height(),
        df.width(),
        start.elapsed().as_secs_f64()
    ));
    Ok(df)
}

pub fn cmd_clean(source: &str, output: &Path, timeout_secs: u64) -> anyhow::Result<()> {
    section("Clean");
    let raw = fetch(source, timeout_secs)?;

    step_run("Cleaning");
    let cleaned = FlightPreprocessor::new().clean(&raw)?;
    step_done(&format!("{:.2}s", cleaned.report.elapsed_secs));

    step_run(&format!("Saving → {}", output.display()));
    save_cleaned(&cleaned.frame, output)?;
    save_schema(&cleaned.schema, output)?;
    step_done(&schema_path(output).display().to_string());

    println!();
    kv("Rows in", &cleaned.report.rows_in.to_string());
    kv("Rows out", &cleaned.report.rows_out.to_string());
    kv("Outliers rejected", &cleaned.report.outliers.rejected_rows.to_string());
    kv("Incomplete rows", &cleaned.report.outliers.incomplete_rows.to_string());
    kv("Columns", &cleaned.frame.width().to_string());
    println!();
    Ok(())
}

pub fn cmd_train(data: &str, output: &Path, raw: bool) -> anyhow::Result<()> {
    section("Train");
    let df = fetch(data, DEFAULT_FETCH_TIMEOUT_SECS)?;

    let (frame, schema) = if raw {
        step_run("Cleaning");
        let cleaned = FlightPreprocessor::new().clean(&df)?;
        step_done(&format!("{} rows", cleaned.height()));
        (cleaned.frame, cleaned.schema)
    } else {
        let DataSource::Local(path) = DataSource::parse(data) else {
            anyhow::bail!("cleaned input must be a local file; pass a raw batch with --raw");
        };
        let schema = load_schema(&path)?;
        step_ok(&format!("Schema {}", schema_path(&path).display()));
        (df, schema)
    };

    step_run("Selecting model");
    let outcome = ModelSelector::default().select(&frame, &schema)?;
    step_done(&outcome.artifact.model_name);

    println!();
    println!(
        "  {:<20} {:>10} {:>10} {:>10} {:>8}",
        muted("model"),
        muted("MAE"),
        muted("MSE"),
        muted("R²"),
        muted("secs")
    );
    for score in &outcome.leaderboard {
        println!(
            "  {:<20} {:>10.4} {:>10.4} {:>10.4} {:>8.3}",
            score.model_name,
            score.metrics.mae,
            score.metrics.mse,
            score.metrics.r2,
            score.training_secs
        );
    }

    outcome.artifact.save(output)?;
    println!();
    step_ok(&format!(
        "Saved {} → {}",
        outcome.artifact.model_name.cyan(),
        output.display()
    ));
    println!();
    Ok(())
}

fn print_run_summary(run: &MonitoringRun, range: &DateRange) {
    kv(
        "Current window",
        &format!(
            "months {}-{}, days {}-{}",
            range.start_month, range.end_month, range.start_day, range.end_day
        ),
    );
    kv("Rows after cleaning", &run.cleaning.rows_out.to_string());
    kv("Reference rows", &run.reference_rows.to_string());
    kv("Current rows", &run.current_rows.to_string());
    if let Some(scored) = &run.scored {
        kv("Training time", &format!("{:.2}s", scored.training_secs));
    }
    kv("Total time", &format!("{:.2}s", run.elapsed_secs));
}

pub fn cmd_monitor(args: MonitorArgs) -> anyhow::Result<()> {
    section("Monitor");
    let (config, json_out, html_out) = args.into_config()?;
    let range = config.date_range;
    let pipeline = MonitoringPipeline::new(config)?;

    step_run("Running monitoring pipeline");
    let run = pipeline.run()?;
    step_done("");
    println!();
    print_run_summary(&run, &range);

    println!();
    for line in TextRenderer.render_set(&run.reports).lines() {
        println!("  {}", line);
    }
    for failure in &run.reports.failures {
        step_warn(&format!("{} report skipped: {}", failure.kind, failure.error));
    }

    if let Some(path) = json_out {
        std::fs::write(&path, run.reports.to_json()?)?;
        step_ok(&format!("JSON → {}", path.display()));
    }
    if let Some(path) = html_out {
        std::fs::write(&path, HtmlRenderer.render_set(&run.reports))?;
        step_ok(&format!("HTML → {}", path.display()));
    }
    println!();
    Ok(())
}

pub fn cmd_predict(args: PredictArgs) -> anyhow::Result<()> {
    section("Predict");
    step_run("Loading model");
    let service = PredictionService::load(&args.model)?;
    step_done(&service.artifact().model_name);

    let input = FlightInput::from(args);
    let record = RecordEncoder::encode(&service.artifact().schema, &input);
    let delay = service.predict(&record)?;

    println!();
    kv("Carrier", &input.carrier);
    kv("Route", &format!("{} → {}", input.origin, input.dest));
    kv("Departure", &input.dep_time.to_string());
    println!(
        "  {:<22} {}",
        muted("Predicted delay"),
        format!("{:.2} minutes", delay).white().bold()
    );
    println!();
    Ok(())
}

pub fn cmd_info(source: &str) -> anyhow::Result<()> {
    section("Info");
    let df = fetch(source, DEFAULT_FETCH_TIMEOUT_SECS)?;

    println!();
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());
    let missing_expected: Vec<&str> = NUMERICAL_COLUMNS
        .iter()
        .chain(CATEGORICAL_COLUMNS.iter())
        .chain(std::iter::once(&TARGET_COLUMN))
        .copied()
        .filter(|c| !has_column(&df, c))
        .collect();
    if missing_expected.is_empty() {
        step_ok("All flight columns present");
    } else {
        step_warn(&format!("Missing flight columns: {:?}", missing_expected));
    }

    println!();
    println!(
        "  {:<22} {:>10} {:>8} {:>12}",
        muted("column"),
        muted("dtype"),
        muted("nulls"),
        muted("mean")
    );
    for col in df.get_columns() {
        let name = col.name().as_str();
        let mean = if col.dtype().is_primitive_numeric() {
            column_f64(&df, name)
                .ok()
                .and_then(|v| crate::utils::mean(&v.into_iter().flatten().collect::<Vec<_>>()))
                .map(|m| format!("{:.3}", m))
                .unwrap_or_else(|| "-".to_string())
        } else {
            "-".to_string()
        };
        println!(
            "  {:<22} {:>10} {:>8} {:>12}",
            name,
            col.dtype().to_string(),
            col.null_count(),
            mean
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_flags_build_config() {
        let cli = Cli::try_parse_from([
            "flight-monitor",
            "monitor",
            "--source",
            "batch.csv",
            "--start-month",
            "2",
            "--end-month",
            "4",
            "--data-drift",
        ])
        .unwrap();
        let Commands::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        let (config, json, html) = args.into_config().unwrap();
        assert_eq!(config.source, "batch.csv");
        assert_eq!(config.date_range, DateRange::new(2, 4, 1, 31));
        assert_eq!(config.reports, ReportSelection::only(ReportKind::DataDrift));
        assert!(json.is_none() && html.is_none());
    }

    #[test]
    fn test_no_toggles_means_all_reports() {
        let cli = Cli::try_parse_from(["flight-monitor", "monitor"]).unwrap();
        let Commands::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        assert!(args.selection().is_none());
    }

    #[test]
    fn test_predict_args_parse_times() {
        let cli = Cli::try_parse_from([
            "flight-monitor",
            "predict",
            "--model",
            "m.json",
            "--carrier",
            "WN",
            "--origin",
            "SFO",
            "--dest",
            "JFK",
            "--dep-time",
            "13:45",
        ])
        .unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let input = FlightInput::from(args);
        assert_eq!(input.dep_time.hhmm(), 1345.0);
        assert_eq!(input.crs_dep_time.hhmm(), 800.0);
        assert_eq!(input.distance, 1000.0);
    }
}
