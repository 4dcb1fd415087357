//! End-to-end monitoring run: clean, partition, fit/score, report

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::preprocessing::{CleaningReport, FlightPreprocessor};
use crate::report::{ReportEngine, ReportFailure, ReportSelection, ReportSet};
use crate::schema::ColumnSchema;
use crate::training::{Regressor, ScoredWindows, Trainer};
use crate::utils::Timer;
use crate::window::partition;
use chrono::Utc;
use polars::prelude::*;
use tracing::{info, warn};

/// Output of one monitoring run
#[derive(Debug, Clone)]
pub struct MonitoringRun {
    pub cleaning: CleaningReport,
    pub schema: ColumnSchema,
    pub reference_rows: usize,
    pub current_rows: usize,
    /// Absent when the reference window could not be trained on
    pub scored: Option<ScoredWindows>,
    pub reports: ReportSet,
    pub elapsed_secs: f64,
}

/// Runs the stages in order; each stage consumes its whole input first
#[derive(Debug, Clone)]
pub struct MonitoringPipeline {
    config: MonitorConfig,
}

impl MonitoringPipeline {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Fetch the configured source and run on it
    pub fn run(&self) -> Result<MonitoringRun> {
        let source = self.config.data_source();
        info!(source = %source, "fetching current batch");
        let raw = source.fetch(self.config.fetch_timeout())?;
        self.run_on_frame(&raw)
    }

    pub fn run_on_frame(&self, raw: &DataFrame) -> Result<MonitoringRun> {
        let timer = Timer::start("monitoring run");

        let cleaned =
            FlightPreprocessor::with_config(self.config.preprocessing.clone()).clean(raw)?;
        let schema = cleaned.schema.clone();

        let (reference, current) = partition(&cleaned.frame, &self.config.date_range)?;
        let reference_rows = reference.height();
        let current_rows = current.height();

        let engine = ReportEngine::new(self.config.drift.clone());
        let selection = self.config.reports;
        if selection.is_empty() {
            warn!("no reports selected");
        }

        let trainer = Trainer::new(self.config.estimator.clone());
        let needs_model = selection.kinds().iter().any(|k| k.needs_predictions());

        let (scored, reports) = if !needs_model {
            let reports = engine.compute_selected(&selection, &reference, &current, &schema);
            (None, reports)
        } else {
            match trainer.fit_and_score(&reference, &current, &schema) {
                Ok(scored) => {
                    info!(
                        model = scored.estimator.name(),
                        secs = scored.training_secs,
                        "model trained on reference window"
                    );
                    let reports = engine.compute_selected(
                        &selection,
                        &scored.reference,
                        &scored.current,
                        &schema,
                    );
                    (Some(scored), reports)
                }
                Err(err @ MonitorError::InsufficientData { .. }) => {
                    warn!(error = %err, "skipping reports that need predictions");
                    let reports = Self::without_predictions(
                        &engine, &selection, &reference, &current, &schema, &err,
                    );
                    (None, reports)
                }
                Err(err) => return Err(err),
            }
        };

        let elapsed_secs = timer.elapsed_secs();
        info!(
            reports = reports.reports.len(),
            failures = reports.failures.len(),
            secs = elapsed_secs,
            "monitoring run finished"
        );

        Ok(MonitoringRun {
            cleaning: cleaned.report,
            schema,
            reference_rows,
            current_rows,
            scored,
            reports,
            elapsed_secs,
        })
    }

    /// Compute the kinds that do not read predictions and record the rest as
    /// failures carrying the training error
    fn without_predictions(
        engine: &ReportEngine,
        selection: &ReportSelection,
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
        cause: &MonitorError,
    ) -> ReportSet {
        let mut remaining = ReportSelection::none();
        let mut skipped = Vec::new();
        for kind in selection.kinds() {
            if kind.needs_predictions() {
                skipped.push(ReportFailure {
                    kind,
                    error: cause.to_string(),
                });
            } else {
                remaining = remaining.with(kind);
            }
        }

        let mut set = if remaining.is_empty() {
            ReportSet {
                generated_at: Utc::now(),
                reports: Vec::new(),
                failures: Vec::new(),
            }
        } else {
            engine.compute_selected(&remaining, reference, current, schema)
        };
        skipped.extend(set.failures.drain(..));
        skipped.sort_by_key(|f| f.kind);
        set.failures = skipped;
        set
    }
}
