//! Column access helpers over polars frames

use crate::error::{MonitorError, Result};
use ndarray::Array2;
use polars::prelude::*;

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Column cast to f64; nulls and NaN both come back as `None`
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| MonitorError::FeatureNotFound(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Column as a float array for polars aggregates; NaN becomes null
pub fn float_chunked(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let values = column_f64(df, name)?;
    Ok(Float64Chunked::from_iter_options(name.into(), values.into_iter()))
}

/// Non-missing values of a column
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(column_f64(df, name)?.into_iter().flatten().collect())
}

pub fn f64_column(name: &str, values: Vec<f64>) -> Column {
    Series::new(name.into(), values).into()
}

/// Keep the rows whose mask entry is true
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    if keep.len() != df.height() {
        return Err(MonitorError::ShapeError {
            expected: format!("mask length = {}", df.height()),
            actual: format!("mask length = {}", keep.len()),
        });
    }
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Extract named columns into a row-major matrix.
///
/// Every cell must be present; a missing value is reported with its column.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            column_f64(df, col_name)?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    v.ok_or_else(|| {
                        MonitorError::DataError(format!(
                            "missing value in column '{}' at row {}",
                            col_name, row
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_f64_treats_nan_as_missing() {
        let df = df!(
            "a" => &[Some(1.0), None, Some(f64::NAN)],
            "b" => &[1i64, 2, 3],
        )
        .unwrap();

        assert_eq!(column_f64(&df, "a").unwrap(), vec![Some(1.0), None, None]);
        assert_eq!(column_values(&df, "b").unwrap(), vec![1.0, 2.0, 3.0]);
        let ca = float_chunked(&df, "a").unwrap();
        assert_eq!(ca.null_count(), 2);
        assert_eq!(ca.mean(), Some(1.0));
        assert!(matches!(
            column_f64(&df, "missing"),
            Err(MonitorError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_columns_to_array2_row_major() {
        let df = df!(
            "x1" => &[1.0, 2.0],
            "x2" => &[10.0, 20.0],
        )
        .unwrap();
        let x = columns_to_array2(&df, &["x2".to_string(), "x1".to_string()]).unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(x[[1, 0]], 20.0);
        assert_eq!(x[[1, 1]], 2.0);
    }

    #[test]
    fn test_columns_to_array2_rejects_missing() {
        let df = df!("x" => &[Some(1.0), None]).unwrap();
        assert!(columns_to_array2(&df, &["x".to_string()]).is_err());
    }

    #[test]
    fn test_filter_rows() {
        let df = df!("x" => &[1.0, 2.0, 3.0]).unwrap();
        let kept = filter_rows(&df, &[true, false, true]).unwrap();
        assert_eq!(column_values(&kept, "x").unwrap(), vec![1.0, 3.0]);
        assert!(filter_rows(&df, &[true]).is_err());
    }
}
