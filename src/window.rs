//! Reference/current partitioning by month and day-of-month

use crate::error::{MonitorError, Result};
use crate::schema::{DAY_OF_MONTH_COLUMN, MONTH_COLUMN};
use crate::utils::{column_f64, filter_rows, has_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Month and day-of-month bounds selecting the current window.
///
/// The predicate is conjunctive: a row is current when its month is in
/// `[start_month, end_month]` AND its day is in `[start_day, end_day]`.
/// Everything else is reference, so a row in the month range but outside the
/// day range lands in reference. `start <= end` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_month: u32,
    pub end_month: u32,
    pub start_day: u32,
    pub end_day: u32,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start_month: 1,
            end_month: 12,
            start_day: 1,
            end_day: 31,
        }
    }
}

impl DateRange {
    pub fn new(start_month: u32, end_month: u32, start_day: u32, end_day: u32) -> Self {
        Self {
            start_month,
            end_month,
            start_day,
            end_day,
        }
    }

    /// Bounds must be calendar values; ordering is left to the caller
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("start_month", self.start_month), ("end_month", self.end_month)] {
            if !(1..=12).contains(&value) {
                return Err(MonitorError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "must be between 1 and 12".to_string(),
                });
            }
        }
        for (name, value) in [("start_day", self.start_day), ("end_day", self.end_day)] {
            if !(1..=31).contains(&value) {
                return Err(MonitorError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "must be between 1 and 31".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a (month, day) pair belongs to the current window
    pub fn contains(&self, month: f64, day: f64) -> bool {
        let month_in = month >= self.start_month as f64 && month <= self.end_month as f64;
        let day_in = day >= self.start_day as f64 && day <= self.end_day as f64;
        month_in && day_in
    }
}

/// Split a cleaned frame into `(reference, current)`.
///
/// Rows keep their original order. Rows with a missing month or day fail the
/// predicate and go to reference.
pub fn partition(cleaned: &DataFrame, range: &DateRange) -> Result<(DataFrame, DataFrame)> {
    for column in [MONTH_COLUMN, DAY_OF_MONTH_COLUMN] {
        if !has_column(cleaned, column) {
            return Err(MonitorError::schema_mismatch(
                "partition",
                format!("column '{}' not found", column),
            ));
        }
    }

    let months = column_f64(cleaned, MONTH_COLUMN)?;
    let days = column_f64(cleaned, DAY_OF_MONTH_COLUMN)?;

    let in_current: Vec<bool> = months
        .iter()
        .zip(days.iter())
        .map(|(m, d)| match (m, d) {
            (Some(m), Some(d)) => range.contains(*m, *d),
            _ => false,
        })
        .collect();
    let in_reference: Vec<bool> = in_current.iter().map(|c| !c).collect();

    let current = filter_rows(cleaned, &in_current)?;
    let reference = filter_rows(cleaned, &in_reference)?;

    info!(
        reference = reference.height(),
        current = current.height(),
        ?range,
        "partitioned dataset"
    );
    if reference.height() == 0 || current.height() == 0 {
        warn!(
            reference = reference.height(),
            current = current.height(),
            "a window is empty"
        );
    }

    Ok((reference, current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_values;

    fn ten_rows() -> DataFrame {
        df!(
            "Month" => &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 5.0, 5.0],
            "DayofMonth" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_month_range_split() {
        let (reference, current) = partition(&ten_rows(), &DateRange::new(2, 4, 1, 10)).unwrap();
        assert_eq!(current.height(), 6);
        assert_eq!(reference.height(), 4);
        assert_eq!(
            column_values(&reference, "Month").unwrap(),
            vec![1.0, 1.0, 5.0, 5.0]
        );
    }

    #[test]
    fn test_day_condition_sends_row_to_reference() {
        // months 2..4 pass, but only days 3..5 are kept
        let (reference, current) = partition(&ten_rows(), &DateRange::new(2, 4, 3, 5)).unwrap();
        assert_eq!(column_values(&current, "DayofMonth").unwrap(), vec![3.0, 4.0, 5.0]);
        assert_eq!(reference.height(), 7);
    }

    #[test]
    fn test_inverted_range_gives_empty_current() {
        let (reference, current) = partition(&ten_rows(), &DateRange::new(4, 2, 1, 31)).unwrap();
        assert_eq!(current.height(), 0);
        assert_eq!(reference.height(), 10);
    }

    #[test]
    fn test_missing_month_column() {
        let df = df!("DayofMonth" => &[1.0]).unwrap();
        let err = partition(&df, &DateRange::default()).unwrap_err();
        assert!(matches!(err, MonitorError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(DateRange::new(1, 12, 1, 31).validate().is_ok());
        assert!(DateRange::new(0, 12, 1, 31).validate().is_err());
        assert!(DateRange::new(1, 12, 1, 32).validate().is_err());
        // ordering is not checked
        assert!(DateRange::new(5, 2, 20, 3).validate().is_ok());
    }
}
