//! Integration test: Reference/current partitioning

mod common;

use flight_delay_monitor::preprocessing::FlightPreprocessor;
use flight_delay_monitor::utils::column_values;
use flight_delay_monitor::window::{partition, DateRange};
use polars::prelude::*;

fn ten_rows() -> DataFrame {
    df!(
        "Month" => &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 5.0, 5.0],
        "DayofMonth" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        "ArrDelay" => &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
    )
    .unwrap()
}

#[test]
fn test_month_range_split() {
    let (reference, current) = partition(&ten_rows(), &DateRange::new(2, 4, 1, 10)).unwrap();

    assert_eq!(current.height(), 6);
    assert_eq!(reference.height(), 4);
    assert_eq!(
        column_values(&current, "Month").unwrap(),
        vec![2.0, 2.0, 3.0, 3.0, 4.0, 4.0]
    );
    assert_eq!(
        column_values(&reference, "Month").unwrap(),
        vec![1.0, 1.0, 5.0, 5.0]
    );
}

#[test]
fn test_day_range_is_conjunctive() {
    // month matches for rows 2..=7, day only for rows with day <= 5
    let (reference, current) = partition(&ten_rows(), &DateRange::new(2, 4, 1, 5)).unwrap();
    assert_eq!(column_values(&current, "DayofMonth").unwrap(), vec![3.0, 4.0, 5.0]);
    assert_eq!(reference.height(), 7);
}

#[test]
fn test_windows_cover_cleaned_batch() {
    let cleaned = FlightPreprocessor::new().clean(&common::raw_flights(80)).unwrap();

    for range in [
        DateRange::new(1, 2, 1, 31),
        DateRange::new(3, 3, 10, 20),
        DateRange::new(5, 1, 1, 31),
        DateRange::default(),
    ] {
        let (reference, current) = partition(&cleaned.frame, &range).unwrap();
        assert_eq!(reference.height() + current.height(), cleaned.height());

        let months = column_values(&current, "Month").unwrap();
        let days = column_values(&current, "DayofMonth").unwrap();
        for (m, d) in months.iter().zip(days.iter()) {
            assert!(range.contains(*m, *d));
        }
        let months = column_values(&reference, "Month").unwrap();
        let days = column_values(&reference, "DayofMonth").unwrap();
        for (m, d) in months.iter().zip(days.iter()) {
            assert!(!range.contains(*m, *d));
        }
    }
}

#[test]
fn test_inverted_range_gives_empty_current() {
    let (reference, current) = partition(&ten_rows(), &DateRange::new(4, 2, 1, 31)).unwrap();
    assert_eq!(current.height(), 0);
    assert_eq!(reference.height(), 10);
}

#[test]
fn test_missing_month_column_fails() {
    let df = df!("DayofMonth" => &[1.0]).unwrap();
    assert!(partition(&df, &DateRange::default()).is_err());
}
