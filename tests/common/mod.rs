//! Shared fixtures for integration tests

#![allow(dead_code)]

use polars::prelude::*;

const CARRIERS: [&str; 3] = ["AA", "DL", "WN"];
const ORIGINS: [&str; 3] = ["ATL", "ORD", "SFO"];
const DESTS: [&str; 2] = ["JFK", "LAX"];

/// Deterministic spread of `n` values in `offset + scale * [0, 10]`
fn spread(n: usize, step: usize, scale: f64, offset: f64) -> Vec<f64> {
    (0..n)
        .map(|i| offset + scale * ((i * step) % 11) as f64)
        .collect()
}

/// Raw flight batch with the full column layout, including the columns the
/// cleaner drops. Months cycle 1..=5, days cycle 1..=28. Every seventh row
/// has missing delay causes. Median-imputed columns have gaps too: every 9th
/// AirTime, every 11th ArrDelay, every 13th TaxiIn, every 17th CRSElapsedTime.
pub fn raw_flights(n: usize) -> DataFrame {
    let month: Vec<i64> = (0..n).map(|i| 1 + (i % 5) as i64).collect();
    let day: Vec<i64> = (0..n).map(|i| 1 + (i % 28) as i64).collect();
    let dep_delay = spread(n, 7, 3.0, -5.0);
    let late_aircraft = spread(n, 3, 2.0, 0.0);
    let arr_delay: Vec<f64> = dep_delay
        .iter()
        .zip(late_aircraft.iter())
        .map(|(d, l)| 1.1 * d + 0.5 * l + 2.0)
        .collect();

    let with_gaps = |values: Vec<f64>, every: usize| -> Vec<Option<f64>> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| if i % every == every - 1 { None } else { Some(v) })
            .collect()
    };

    let cycle = |codes: &[&'static str]| -> Vec<&'static str> {
        (0..n).map(|i| codes[i % codes.len()]).collect()
    };

    df!(
        "Unnamed: 0" => &(0..n as i64).collect::<Vec<_>>(),
        "Year" => &vec![2008i64; n],
        "Month" => &month,
        "DayofMonth" => &day,
        "DayOfWeek" => &(0..n).map(|i| 1 + (i % 7) as i64).collect::<Vec<_>>(),
        "DepTime" => &spread(n, 5, 100.0, 600.0),
        "CRSDepTime" => &spread(n, 5, 100.0, 590.0),
        "ArrTime" => &spread(n, 5, 100.0, 800.0),
        "CRSArrTime" => &spread(n, 4, 100.0, 790.0),
        "UniqueCarrier" => &cycle(&CARRIERS[..]),
        "FlightNum" => &spread(n, 9, 150.0, 100.0),
        "TailNum" => &vec!["N100"; n],
        "ActualElapsedTime" => &spread(n, 2, 10.0, 80.0),
        "CRSElapsedTime" => &with_gaps(spread(n, 2, 10.0, 85.0), 17),
        "AirTime" => &with_gaps(spread(n, 2, 9.0, 60.0), 9),
        "ArrDelay" => &with_gaps(arr_delay, 11),
        "DepDelay" => &dep_delay,
        "Origin" => &cycle(&ORIGINS[..]),
        "Dest" => &cycle(&DESTS[..]),
        "Distance" => &spread(n, 2, 80.0, 200.0),
        "TaxiIn" => &with_gaps(spread(n, 3, 1.0, 3.0), 13),
        "TaxiOut" => &spread(n, 4, 2.0, 8.0),
        "Cancelled" => &vec![0i64; n],
        "CancellationCode" => &vec!["N"; n],
        "Diverted" => &vec![0i64; n],
        "CarrierDelay" => &with_gaps(spread(n, 4, 1.5, 0.0), 7),
        "WeatherDelay" => &with_gaps(spread(n, 6, 0.5, 0.0), 7),
        "NASDelay" => &with_gaps(spread(n, 8, 1.0, 0.0), 7),
        "SecurityDelay" => &with_gaps(spread(n, 10, 0.2, 0.0), 7),
        "LateAircraftDelay" => &with_gaps(late_aircraft, 7),
    )
    .unwrap()
}

/// Cleaning config without outlier rejection, for exact row accounting
pub fn no_outliers() -> flight_delay_monitor::preprocessing::PreprocessingConfig {
    flight_delay_monitor::preprocessing::PreprocessingConfig::default().without_outlier_rejection()
}
