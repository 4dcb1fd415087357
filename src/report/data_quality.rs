//! Descriptive data quality statistics per window

use super::ReportKind;
use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::utils::{float_chunked, has_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Missing share above which a column is flagged
const HIGH_MISSINGNESS: f64 = 0.3;
/// Distinct share above which a column is flagged
const HIGH_CARDINALITY: f64 = 0.95;

/// Statistics for a single column in one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub missing_share: f64,
    pub distinct: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
}

/// Quality warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QualityWarning {
    /// Column has high proportion of missing values
    HighMissingness { column: String, ratio: f64 },
    /// Column has very high cardinality (potential ID column)
    HighCardinality {
        column: String,
        unique_count: usize,
        total_count: usize,
    },
    /// Duplicate rows detected
    DuplicateRows { count: usize, total: usize },
    /// Constant column (zero variance)
    ConstantColumn { column: String },
}

/// Quality summary of one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowQuality {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub column_stats: Vec<ColumnQuality>,
    pub warnings: Vec<QualityWarning>,
}

impl WindowQuality {
    /// Statistics over the given columns; duplicates are counted over every
    /// column of the frame
    pub fn compute(df: &DataFrame, columns: &[String], window: &str) -> Result<Self> {
        let rows = df.height();
        let mut column_stats = Vec::with_capacity(columns.len());
        let mut warnings = Vec::new();

        for column in columns {
            let ca = float_chunked(df, column).map_err(|_| {
                MonitorError::report(
                    ReportKind::DataQuality.to_string(),
                    Some(column),
                    format!("column missing from {} window", window),
                )
            })?;
            let stats = column_quality(column, &ca)?;

            if rows > 0 && stats.missing_share > HIGH_MISSINGNESS {
                warnings.push(QualityWarning::HighMissingness {
                    column: column.clone(),
                    ratio: stats.missing_share,
                });
            }
            if stats.count > 1 && stats.distinct == 1 {
                warnings.push(QualityWarning::ConstantColumn {
                    column: column.clone(),
                });
            }
            if rows > 20 && stats.distinct as f64 / rows as f64 > HIGH_CARDINALITY {
                warnings.push(QualityWarning::HighCardinality {
                    column: column.clone(),
                    unique_count: stats.distinct,
                    total_count: rows,
                });
            }
            column_stats.push(stats);
        }

        let duplicate_rows = count_duplicate_rows(df)?;
        if duplicate_rows > 0 {
            warnings.push(QualityWarning::DuplicateRows {
                count: duplicate_rows,
                total: rows,
            });
        }

        Ok(Self {
            rows,
            columns: columns.len(),
            missing_cells: column_stats.iter().map(|c| c.missing).sum(),
            duplicate_rows,
            column_stats,
            warnings,
        })
    }

    pub fn column(&self, name: &str) -> Option<&ColumnQuality> {
        self.column_stats.iter().find(|c| c.column == name)
    }
}

fn column_quality(column: &str, ca: &Float64Chunked) -> Result<ColumnQuality> {
    let missing = ca.null_count();
    let distinct = ca.clone().into_series().drop_nulls().n_unique()?;

    Ok(ColumnQuality {
        column: column.to_string(),
        count: ca.len() - missing,
        missing,
        missing_share: if ca.is_empty() {
            0.0
        } else {
            missing as f64 / ca.len() as f64
        },
        distinct,
        min: ca.min(),
        max: ca.max(),
        mean: ca.mean(),
        median: ca.median(),
        std: ca.std(0),
    })
}

/// Rows that share every value with at least one other row
fn count_duplicate_rows(df: &DataFrame) -> Result<usize> {
    if df.width() == 0 {
        return Ok(0);
    }
    Ok(df.is_duplicated()?.sum().unwrap_or(0) as usize)
}

/// Side-by-side quality of both windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub reference: WindowQuality,
    pub current: WindowQuality,
}

impl DataQualityReport {
    /// Covers the numerical features and the target; predictions are not read
    pub fn compute(
        reference: &DataFrame,
        current: &DataFrame,
        schema: &ColumnSchema,
    ) -> Result<Self> {
        let mut columns = schema.numerical_features.clone();
        if has_column(reference, &schema.target) || has_column(current, &schema.target) {
            columns.push(schema.target.clone());
        }

        Ok(Self {
            reference: WindowQuality::compute(reference, &columns, "reference")?,
            current: WindowQuality::compute(current, &columns, "current")?,
        })
    }

    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for (window, q) in [("reference", &self.reference), ("current", &self.current)] {
            out.insert(format!("{}.rows", window), q.rows as f64);
            out.insert(format!("{}.missing_cells", window), q.missing_cells as f64);
            out.insert(format!("{}.duplicate_rows", window), q.duplicate_rows as f64);
            for c in &q.column_stats {
                out.insert(format!("{}.{}.missing", window, c.column), c.missing as f64);
                out.insert(format!("{}.{}.distinct", window, c.column), c.distinct as f64);
                for (name, value) in [("min", c.min), ("max", c.max), ("mean", c.mean)] {
                    if let Some(v) = value {
                        out.insert(format!("{}.{}.{}", window, c.column, name), v);
                    }
                }
            }
        }
        out
    }
}
