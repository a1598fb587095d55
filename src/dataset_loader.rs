// src/dataset_loader.rs

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use polars::prelude::*;
use reqwest::Client;
use serde_json::{to_string, Value};
use tokio::time::sleep;

use crate::config::MAX_LOAD_RETRIES;
use crate::observation_table::ObservationTable;

/// A place the observation dataset can be loaded from.
///
/// Sources produce a raw DataFrame; [`DatasetLoader`] finalizes it into an
/// [`ObservationTable`].
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Stable identifier for this source, used as the session cache key.
    fn cache_key(&self) -> String;

    async fn load(&self, client: &Client) -> Result<DataFrame, PolarsError>;
}

/// Loads the dataset from a CSV file on disk.
pub struct CsvFileSource {
    pub path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvFileSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DatasetSource for CsvFileSource {
    fn cache_key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    async fn load(&self, _client: &Client) -> Result<DataFrame, PolarsError> {
        CsvReader::from_path(&self.path)?.has_header(true).finish()
    }
}

/// Fetches the dataset as CSV over HTTP.
pub struct RemoteCsvSource {
    pub url: String,
}

impl RemoteCsvSource {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteCsvSource { url: url.into() }
    }
}

#[async_trait]
impl DatasetSource for RemoteCsvSource {
    fn cache_key(&self) -> String {
        self.url.clone()
    }

    async fn load(&self, client: &Client) -> Result<DataFrame, PolarsError> {
        let body = fetch_with_retries(client, &self.url).await?;
        CsvReader::new(Cursor::new(body)).has_header(true).finish()
    }
}

/// Fetches the dataset as a JSON document: either a top-level array of row
/// objects or an object with a `records` array.
pub struct RemoteJsonSource {
    pub url: String,
}

impl RemoteJsonSource {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteJsonSource { url: url.into() }
    }
}

#[async_trait]
impl DatasetSource for RemoteJsonSource {
    fn cache_key(&self) -> String {
        self.url.clone()
    }

    async fn load(&self, client: &Client) -> Result<DataFrame, PolarsError> {
        let body = fetch_with_retries(client, &self.url).await?;
        records_to_dataframe(&body)
    }
}

/// Parses a JSON dataset body into a DataFrame.
pub fn records_to_dataframe(body: &str) -> Result<DataFrame, PolarsError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| PolarsError::ComputeError(format!("invalid dataset JSON: {}", e).into()))?;

    let records = match &json {
        Value::Array(_) => &json,
        Value::Object(map) => map
            .get("records")
            .ok_or(PolarsError::NoData("dataset JSON has no records field".into()))?,
        _ => {
            return Err(PolarsError::ComputeError(
                "dataset JSON is neither an array nor an object".into(),
            ))
        }
    };

    let json_string =
        to_string(records).map_err(|e| PolarsError::ComputeError(e.to_string().into()))?;
    JsonReader::new(Cursor::new(json_string)).finish()
}

async fn fetch_with_retries(client: &Client, url: &str) -> Result<String, PolarsError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(body) => return Ok(body),
            Err(error) => {
                attempt += 1;
                if attempt >= MAX_LOAD_RETRIES {
                    return Err(PolarsError::ComputeError(
                        format!("failed to fetch {} after {} attempts: {}", url, attempt, error)
                            .into(),
                    ));
                }
                let backoff = Duration::from_secs(2u64.pow(attempt));
                eprintln!("fetch of {} failed ({}), retrying in {:?}", url, error, backoff);
                sleep(backoff).await;
            }
        }
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    response.text().await.map_err(|e| e.to_string())
}

/// Turns a raw source DataFrame into an [`ObservationTable`].
pub struct DatasetLoader;

impl DatasetLoader {
    /// Loads `source`, sorts by the date column and parses it.
    pub async fn load(
        source: &dyn DatasetSource,
        client: &Client,
        date_column: &str,
    ) -> Result<ObservationTable, PolarsError> {
        let mut df = source.load(client).await?;
        Self::finalize(&mut df, date_column)?;
        ObservationTable::new(df, date_column)
    }

    fn finalize(df: &mut DataFrame, date_column: &str) -> Result<(), PolarsError> {
        df.sort_in_place(&[date_column], SortMultipleOptions::default())?;
        Ok(())
    }
}
