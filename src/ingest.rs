//! Raw dataset ingress and cleaned-batch egress

use crate::error::{MonitorError, Result};
use crate::schema::ColumnSchema;
use crate::utils::Timer;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default timeout for remote fetches
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// Where a raw flight batch comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    /// `http://` and `https://` locations are remote, anything else is a path
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::Local(PathBuf::from(trimmed))
        }
    }

    pub fn name(&self) -> String {
        match self {
            DataSource::Local(path) => path.display().to_string(),
            DataSource::Remote(url) => url.clone(),
        }
    }

    /// Load the whole batch. Any failure is a `DataFetch` error; nothing partial
    /// is returned.
    pub fn fetch(&self, timeout: Duration) -> Result<DataFrame> {
        let timer = Timer::start("fetch");
        let df = match self {
            DataSource::Local(path) => read_csv_file(path),
            DataSource::Remote(url) => fetch_remote(url, timeout),
        }
        .map_err(|e| match e {
            err @ MonitorError::DataFetch { .. } => err,
            other => MonitorError::data_fetch(self.name(), other.to_string()),
        })?;

        if df.width() == 0 {
            return Err(MonitorError::data_fetch(self.name(), "source has no columns"));
        }

        info!(
            source = %self.name(),
            rows = df.height(),
            cols = df.width(),
            secs = timer.elapsed_secs(),
            "loaded raw data"
        );
        Ok(df)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn read_csv_file(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(MonitorError::data_fetch(
            path.display().to_string(),
            "file does not exist",
        ));
    }
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(10_000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn fetch_remote(url: &str, timeout: Duration) -> Result<DataFrame> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(MonitorError::data_fetch(
            url,
            format!("server returned status {}", response.status()),
        ));
    }
    let bytes = response.bytes()?.to_vec();

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(10_000))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

/// Write a cleaned batch as CSV, header included, no index column
pub fn save_cleaned(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    let mut out = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;
    info!(path = %path.display(), rows = out.height(), "saved cleaned data");
    Ok(())
}

/// Sidecar file holding the schema of a cleaned CSV: `cleaned.csv` ->
/// `cleaned.schema.json`
pub fn schema_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("schema.json")
}

/// Write the schema next to a cleaned CSV; the indicator columns alone do
/// not record each family's reference level
pub fn save_schema(schema: &ColumnSchema, csv_path: &Path) -> Result<()> {
    let path = schema_path(csv_path);
    std::fs::write(&path, serde_json::to_string_pretty(schema)?)?;
    info!(path = %path.display(), "saved column schema");
    Ok(())
}

pub fn load_schema(csv_path: &Path) -> Result<ColumnSchema> {
    let path = schema_path(csv_path);
    let json = std::fs::read_to_string(&path).map_err(|e| {
        MonitorError::ConfigError(format!("cannot read schema {}: {}", path.display(), e))
    })?;
    let schema: ColumnSchema = serde_json::from_str(&json)?;
    schema.validate()?;
    Ok(schema)
}
