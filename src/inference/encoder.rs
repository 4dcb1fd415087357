//! Encoding of raw flight fields into a feature record

use super::FeatureRecord;
use crate::error::{MonitorError, Result};
use crate::schema::{indicator_name, ColumnSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock time entered as HH:MM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(MonitorError::InvalidParameter {
                name: "time".to_string(),
                value: format!("{}:{}", hour, minute),
                reason: "hour must be 0-23 and minute 0-59".to_string(),
            });
        }
        Ok(Self { hour, minute })
    }

    /// Dataset representation: 08:05 -> 805
    pub fn hhmm(&self) -> f64 {
        (self.hour * 100 + self.minute) as f64
    }
}

impl Default for ClockTime {
    fn default() -> Self {
        Self { hour: 8, minute: 0 }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MonitorError::InvalidParameter {
            name: "time".to_string(),
            value: s.to_string(),
            reason: "expected HH:MM".to_string(),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

/// Raw fields of one flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightInput {
    pub month: u32,
    pub day_of_month: u32,
    pub day_of_week: u32,
    pub dep_time: ClockTime,
    pub crs_dep_time: ClockTime,
    pub crs_arr_time: ClockTime,
    pub flight_num: f64,
    pub crs_elapsed_time: f64,
    pub air_time: f64,
    pub dep_delay: f64,
    pub distance: f64,
    pub taxi_in: f64,
    pub taxi_out: f64,
    pub carrier_delay: f64,
    pub weather_delay: f64,
    pub nas_delay: f64,
    pub security_delay: f64,
    pub late_aircraft_delay: f64,
    pub carrier: String,
    pub origin: String,
    pub dest: String,
}

impl Default for FlightInput {
    fn default() -> Self {
        Self {
            month: 1,
            day_of_month: 1,
            day_of_week: 1,
            dep_time: ClockTime::default(),
            crs_dep_time: ClockTime::default(),
            crs_arr_time: ClockTime::default(),
            flight_num: 1.0,
            crs_elapsed_time: 120.0,
            air_time: 100.0,
            dep_delay: 0.0,
            distance: 1000.0,
            taxi_in: 10.0,
            taxi_out: 20.0,
            carrier_delay: 0.0,
            weather_delay: 0.0,
            nas_delay: 0.0,
            security_delay: 0.0,
            late_aircraft_delay: 0.0,
            carrier: String::new(),
            origin: String::new(),
            dest: String::new(),
        }
    }
}

impl FlightInput {
    /// Numerical fields keyed by dataset column name
    fn numeric_fields(&self) -> [(&'static str, f64); 18] {
        [
            ("Month", self.month as f64),
            ("DayofMonth", self.day_of_month as f64),
            ("DayOfWeek", self.day_of_week as f64),
            ("DepTime", self.dep_time.hhmm()),
            ("CRSDepTime", self.crs_dep_time.hhmm()),
            ("CRSArrTime", self.crs_arr_time.hhmm()),
            ("FlightNum", self.flight_num),
            ("CRSElapsedTime", self.crs_elapsed_time),
            ("AirTime", self.air_time),
            ("DepDelay", self.dep_delay),
            ("Distance", self.distance),
            ("TaxiIn", self.taxi_in),
            ("TaxiOut", self.taxi_out),
            ("CarrierDelay", self.carrier_delay),
            ("WeatherDelay", self.weather_delay),
            ("NASDelay", self.nas_delay),
            ("SecurityDelay", self.security_delay),
            ("LateAircraftDelay", self.late_aircraft_delay),
        ]
    }

    fn category(&self, family: &str) -> Option<&str> {
        match family {
            "UniqueCarrier" => Some(&self.carrier),
            "Origin" => Some(&self.origin),
            "Dest" => Some(&self.dest),
            _ => None,
        }
    }
}

/// Builds feature records against a fixed schema
pub struct RecordEncoder;

impl RecordEncoder {
    /// Every feature column starts at zero; the chosen code of each family
    /// sets its indicator. The reference level sets nothing. A code outside
    /// the vocabulary still adds its indicator so that the mismatch surfaces
    /// at prediction time.
    pub fn encode(schema: &ColumnSchema, input: &FlightInput) -> FeatureRecord {
        let mut record: FeatureRecord = schema
            .feature_columns()
            .into_iter()
            .map(|c| (c, 0.0))
            .collect();

        for (column, value) in input.numeric_fields() {
            if schema.numerical_features.iter().any(|c| c == column) {
                record.set(column, value);
            }
        }

        for levels in &schema.vocabulary.families {
            let Some(code) = input.category(&levels.family) else {
                continue;
            };
            if code.is_empty() || levels.reference_level() == Some(code) {
                continue;
            }
            record.set(indicator_name(&levels.family, code), 1.0);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CategoricalVocabulary, CategoryLevels};

    fn schema() -> ColumnSchema {
        ColumnSchema::flights(CategoricalVocabulary::new(vec![
            CategoryLevels::new("UniqueCarrier", ["AA", "DL", "WN"].map(String::from)),
            CategoryLevels::new("Origin", ["ATL", "SFO"].map(String::from)),
            CategoryLevels::new("Dest", ["JFK", "ORD"].map(String::from)),
        ]))
    }

    #[test]
    fn test_clock_time() {
        let t: ClockTime = "08:05".parse().unwrap();
        assert_eq!(t.hhmm(), 805.0);
        assert_eq!(t.to_string(), "08:05");
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("0800".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_encode_sets_indicators() {
        let schema = schema();
        let input = FlightInput {
            carrier: "WN".to_string(),
            origin: "ATL".to_string(),
            dest: "ORD".to_string(),
            ..FlightInput::default()
        };
        let record = RecordEncoder::encode(&schema, &input);

        assert_eq!(record.len(), schema.feature_columns().len());
        assert_eq!(record.get("UniqueCarrier_WN"), Some(1.0));
        assert_eq!(record.get("UniqueCarrier_DL"), Some(0.0));
        assert_eq!(record.get("Origin_SFO"), Some(0.0));
        assert_eq!(record.get("Dest_ORD"), Some(1.0));
        assert_eq!(record.get("DepTime"), Some(800.0));
        assert_eq!(record.get("Distance"), Some(1000.0));
    }

    #[test]
    fn test_unknown_code_adds_column() {
        let schema = schema();
        let input = FlightInput {
            carrier: "ZZ".to_string(),
            ..FlightInput::default()
        };
        let record = RecordEncoder::encode(&schema, &input);
        assert_eq!(record.len(), schema.feature_columns().len() + 1);
        assert_eq!(record.get("UniqueCarrier_ZZ"), Some(1.0));
    }
}
