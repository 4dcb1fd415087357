//! Column schema shared by cleaning, training, reporting and prediction
//!
//! The flight dataset has a fixed layout. Everything that depends on column
//! names (which columns are features, which one is the target, which
//! indicator columns the categorical encoding produces) is carried in one
//! immutable [`ColumnSchema`] value that is handed to every stage.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Target column: arrival delay in minutes
pub const TARGET_COLUMN: &str = "ArrDelay";

/// Column written by the trainer with the model's point estimate
pub const PREDICTION_COLUMN: &str = "prediction";

pub const MONTH_COLUMN: &str = "Month";
pub const DAY_OF_MONTH_COLUMN: &str = "DayofMonth";

/// Numerical feature columns, in model input order
pub const NUMERICAL_COLUMNS: [&str; 18] = [
    "Month",
    "DayofMonth",
    "DayOfWeek",
    "DepTime",
    "CRSDepTime",
    "CRSArrTime",
    "FlightNum",
    "CRSElapsedTime",
    "AirTime",
    "DepDelay",
    "Distance",
    "TaxiIn",
    "TaxiOut",
    "CarrierDelay",
    "WeatherDelay",
    "NASDelay",
    "SecurityDelay",
    "LateAircraftDelay",
];

/// Delay-cause columns: a missing cell means no minutes were attributed to the cause
pub const DELAY_CAUSE_COLUMNS: [&str; 5] = [
    "CarrierDelay",
    "WeatherDelay",
    "NASDelay",
    "SecurityDelay",
    "LateAircraftDelay",
];

/// Columns imputed with the median of the batch being cleaned
pub const MEDIAN_IMPUTED_COLUMNS: [&str; 4] = ["AirTime", "ArrDelay", "TaxiIn", "CRSElapsedTime"];

/// Identifier, leakage and unused columns removed before anything else
pub const DROPPED_COLUMNS: [&str; 9] = [
    "",
    "Unnamed: 0",
    "Year",
    "CancellationCode",
    "TailNum",
    "Diverted",
    "Cancelled",
    "ArrTime",
    "ActualElapsedTime",
];

/// Categorical families expanded into indicator columns
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["UniqueCarrier", "Origin", "Dest"];

/// Fitted code vocabulary for one categorical family.
///
/// Codes are kept sorted. The first code is the reference level and gets no
/// indicator column, so a record with that code has an all-zero block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLevels {
    pub family: String,
    pub codes: Vec<String>,
}

impl CategoryLevels {
    pub fn new(family: impl Into<String>, codes: impl IntoIterator<Item = String>) -> Self {
        let codes: BTreeSet<String> = codes.into_iter().collect();
        Self {
            family: family.into(),
            codes: codes.into_iter().collect(),
        }
    }

    /// Dropped level, if the family has any code at all
    pub fn reference_level(&self) -> Option<&str> {
        self.codes.first().map(String::as_str)
    }

    /// Indicator column names, reference level excluded
    pub fn indicator_columns(&self) -> Vec<String> {
        self.codes
            .iter()
            .skip(1)
            .map(|code| indicator_name(&self.family, code))
            .collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.binary_search_by(|c| c.as_str().cmp(code)).is_ok()
    }
}

/// Indicator column name for a family/code pair
pub fn indicator_name(family: &str, code: &str) -> String {
    format!("{}_{}", family, code)
}

/// Vocabulary of every categorical family, in [`CATEGORICAL_COLUMNS`] order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoricalVocabulary {
    pub families: Vec<CategoryLevels>,
}

impl CategoricalVocabulary {
    pub fn new(families: Vec<CategoryLevels>) -> Self {
        Self { families }
    }

    pub fn family(&self, name: &str) -> Option<&CategoryLevels> {
        self.families.iter().find(|f| f.family == name)
    }

    pub fn indicator_columns(&self) -> Vec<String> {
        self.families
            .iter()
            .flat_map(|f| f.indicator_columns())
            .collect()
    }

    /// Map indicator column name -> owning family
    pub fn indicator_families(&self) -> BTreeMap<String, String> {
        self.families
            .iter()
            .flat_map(|f| {
                f.indicator_columns()
                    .into_iter()
                    .map(move |col| (col, f.family.clone()))
            })
            .collect()
    }
}

/// Column mapping shared by training, reporting and prediction.
///
/// The same value must be used for every stage of a run; comparisons between
/// windows built with different schemas are meaningless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub target: String,
    pub prediction: String,
    pub numerical_features: Vec<String>,
    pub vocabulary: CategoricalVocabulary,
}

impl ColumnSchema {
    /// Flight schema with the given categorical vocabulary
    pub fn flights(vocabulary: CategoricalVocabulary) -> Self {
        Self {
            target: TARGET_COLUMN.to_string(),
            prediction: PREDICTION_COLUMN.to_string(),
            numerical_features: NUMERICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vocabulary,
        }
    }

    /// Schema for arbitrary numeric frames (no categorical families)
    pub fn numeric(
        target: impl Into<String>,
        prediction: impl Into<String>,
        numerical_features: Vec<String>,
    ) -> Self {
        Self {
            target: target.into(),
            prediction: prediction.into(),
            numerical_features,
            vocabulary: CategoricalVocabulary::default(),
        }
    }

    /// Fixed model input column list: numerical features then indicators
    pub fn feature_columns(&self) -> Vec<String> {
        let mut columns = self.numerical_features.clone();
        columns.extend(self.vocabulary.indicator_columns());
        columns
    }

    /// Check that the schema is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.target == self.prediction {
            return Err(MonitorError::ConfigError(format!(
                "target and prediction columns must differ (both '{}')",
                self.target
            )));
        }
        let features = self.feature_columns();
        let mut seen = BTreeSet::new();
        for column in &features {
            if column == &self.target || column == &self.prediction {
                return Err(MonitorError::ConfigError(format!(
                    "feature column '{}' collides with target/prediction",
                    column
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(MonitorError::ConfigError(format!(
                    "duplicate feature column '{}'",
                    column
                )));
            }
        }
        Ok(())
    }
}
