//! Integration test: Report engine on scored windows

mod common;

use flight_delay_monitor::drift::{DriftConfig, StatTest};
use flight_delay_monitor::error::MonitorError;
use flight_delay_monitor::preprocessing::FlightPreprocessor;
use flight_delay_monitor::report::{
    HtmlRenderer, Report, ReportEngine, ReportKind, ReportRenderer, ReportSelection,
    TextRenderer,
};
use flight_delay_monitor::schema::ColumnSchema;
use flight_delay_monitor::training::{ScoredWindows, Trainer};
use flight_delay_monitor::window::{partition, DateRange};
use polars::prelude::*;

fn scored() -> (ScoredWindows, ColumnSchema) {
    let cleaned = FlightPreprocessor::with_config(common::no_outliers())
        .clean(&common::raw_flights(100))
        .unwrap();
    let (reference, current) = partition(&cleaned.frame, &DateRange::new(4, 5, 1, 31)).unwrap();
    let scored = Trainer::default()
        .fit_and_score(&reference, &current, &cleaned.schema)
        .unwrap();
    (scored, cleaned.schema)
}

fn simple_schema() -> ColumnSchema {
    ColumnSchema::numeric("ArrDelay", "prediction", vec!["DepDelay".to_string()])
}

#[test]
fn test_all_reports_on_flight_windows() {
    let (scored, schema) = scored();
    let set = ReportEngine::default().compute_selected(
        &ReportSelection::all(),
        &scored.reference,
        &scored.current,
        &schema,
    );

    assert!(set.failures.is_empty(), "{:?}", set.failures);
    assert_eq!(set.reports.len(), 4);

    let drift = set.data_drift().unwrap();
    assert_eq!(drift.number_of_columns, schema.numerical_features.len());
    // the current window holds only months 4 and 5
    assert!(drift.column("Month").unwrap().drift_detected);

    let performance = set.performance().unwrap();
    assert_eq!(performance.reference.count, scored.reference.height());
    assert_eq!(performance.current.count, scored.current.height());

    let quality = set.data_quality().unwrap();
    assert_eq!(quality.reference.rows, scored.reference.height());
}

#[test]
fn test_reports_are_repeatable() {
    let (scored, schema) = scored();
    let engine = ReportEngine::default();
    for kind in ReportKind::ALL {
        let a = engine
            .compute(kind, &scored.reference, &scored.current, &schema)
            .unwrap();
        let b = engine
            .compute(kind, &scored.reference, &scored.current, &schema)
            .unwrap();
        assert_eq!(a.metrics(), b.metrics(), "{} differs", kind);
    }
}

#[test]
fn test_constant_reference_target() {
    let reference = df!(
        "ArrDelay" => &[0.0; 10],
        "prediction" => &[0.0; 10],
        "DepDelay" => &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
    )
    .unwrap();
    let current = df!(
        "ArrDelay" => &[15.0, 40.0, 22.0, 8.0, 31.0],
        "prediction" => &[0.0; 5],
        "DepDelay" => &[1.0, 3.0, 5.0, 7.0, 9.0],
    )
    .unwrap();
    let engine = ReportEngine::default();
    let schema = simple_schema();

    let Report::Performance(performance) = engine
        .compute(ReportKind::Performance, &reference, &current, &schema)
        .unwrap()
    else {
        panic!("expected performance report");
    };
    assert_eq!(performance.reference.mae, 0.0);
    assert_eq!(performance.reference.rmse, 0.0);
    assert!(performance.current.mae > 0.0);

    let Report::TargetDrift(target) = engine
        .compute(ReportKind::TargetDrift, &reference, &current, &schema)
        .unwrap()
    else {
        panic!("expected target drift report");
    };
    assert!(target.target.drift_detected);
}

#[test]
fn test_failure_is_isolated() {
    let reference = df!("ArrDelay" => &[1.0, 2.0, 3.0], "DepDelay" => &[1.0, 2.0, 3.0]).unwrap();
    let current = reference.clone();

    let set = ReportEngine::default().compute_selected(
        &ReportSelection::all(),
        &reference,
        &current,
        &simple_schema(),
    );

    // no prediction column: performance and target drift fail
    assert!(set.failure(ReportKind::Performance).is_some());
    assert!(set.failure(ReportKind::TargetDrift).is_some());
    assert!(set.data_drift().is_some());
    assert!(set.data_quality().is_some());
}

#[test]
fn test_missing_column_error_names_column() {
    let reference = df!("ArrDelay" => &[1.0], "prediction" => &[1.0]).unwrap();
    let err = ReportEngine::default()
        .compute(ReportKind::DataDrift, &reference, &reference, &simple_schema())
        .unwrap_err();
    match err {
        MonitorError::ReportComputation { column, .. } => {
            assert_eq!(column.as_deref(), Some("DepDelay"))
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_stat_test_override() {
    let (scored, schema) = scored();
    let engine = ReportEngine::new(DriftConfig::default().with_stat_test(StatTest::Psi));
    let Report::DataDrift(report) = engine
        .compute(ReportKind::DataDrift, &scored.reference, &scored.current, &schema)
        .unwrap()
    else {
        panic!("expected data drift report");
    };
    assert!(report.columns.iter().all(|c| c.stat_test == "psi"));
}

#[test]
fn test_renderers_and_json() {
    let (scored, schema) = scored();
    let set = ReportEngine::default().compute_selected(
        &ReportSelection::only(ReportKind::DataDrift).with(ReportKind::Performance),
        &scored.reference,
        &scored.current,
        &schema,
    );

    let text = TextRenderer.render_set(&set);
    assert!(text.contains("Data Drift Report"));
    assert!(!text.contains("Data Quality Report"));

    let html = HtmlRenderer.render_set(&set);
    assert!(html.contains("<h2>Model Performance Report</h2>"));

    let json: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();
    assert_eq!(json["reports"].as_array().unwrap().len(), 2);
}
