//! Integration test: Model artifact to single-flight prediction

mod common;

use flight_delay_monitor::error::MonitorError;
use flight_delay_monitor::inference::{ClockTime, FlightInput, PredictionService, RecordEncoder};
use flight_delay_monitor::preprocessing::FlightPreprocessor;
use flight_delay_monitor::training::{EstimatorConfig, ModelSelector};

fn service() -> PredictionService {
    let cleaned = FlightPreprocessor::new().clean(&common::raw_flights(90)).unwrap();
    let outcome = ModelSelector::default()
        .with_candidates(vec![EstimatorConfig::ridge()])
        .select(&cleaned.frame, &cleaned.schema)
        .unwrap();
    PredictionService::new(outcome.artifact).unwrap()
}

fn flight(carrier: &str, origin: &str, dest: &str) -> FlightInput {
    FlightInput {
        month: 3,
        day_of_month: 14,
        day_of_week: 5,
        dep_time: ClockTime::new(9, 30).unwrap(),
        dep_delay: 12.0,
        carrier: carrier.to_string(),
        origin: origin.to_string(),
        dest: dest.to_string(),
        ..FlightInput::default()
    }
}

#[test]
fn test_known_codes_predict() {
    let service = service();
    let schema = &service.artifact().schema;

    let routes = [("AA", "ATL", "JFK"), ("WN", "SFO", "LAX"), ("DL", "ORD", "JFK")];
    for (carrier, origin, dest) in routes {
        let record = RecordEncoder::encode(schema, &flight(carrier, origin, dest));
        let delay = service.predict(&record).unwrap();
        assert!(delay.is_finite());
    }
}

#[test]
fn test_unknown_carrier_is_rejected() {
    let service = service();
    let record = RecordEncoder::encode(&service.artifact().schema, &flight("ZZ", "ATL", "JFK"));
    let err = service.predict(&record).unwrap_err();
    assert!(matches!(err, MonitorError::SchemaMismatch { .. }));
}

#[test]
fn test_departure_delay_moves_prediction() {
    let service = service();
    let schema = &service.artifact().schema;

    let delayed = |dep_delay: f64| FlightInput {
        dep_delay,
        ..flight("DL", "ORD", "LAX")
    };
    let on_time = RecordEncoder::encode(schema, &delayed(0.0));
    let late = RecordEncoder::encode(schema, &delayed(25.0));
    assert!(service.predict(&late).unwrap() > service.predict(&on_time).unwrap());
}

#[test]
fn test_load_from_file() {
    let cleaned = FlightPreprocessor::new().clean(&common::raw_flights(60)).unwrap();
    let outcome = ModelSelector::default()
        .with_candidates(vec![EstimatorConfig::Linear])
        .select(&cleaned.frame, &cleaned.schema)
        .unwrap();

    let path = std::env::temp_dir().join("flight_delay_monitor_prediction_model.json");
    outcome.artifact.save(&path).unwrap();
    let service = PredictionService::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(service.feature_columns(), cleaned.schema.feature_columns().as_slice());
    let record = RecordEncoder::encode(&service.artifact().schema, &flight("AA", "ATL", "JFK"));
    assert!(service.predict(&record).unwrap().is_finite());
}
