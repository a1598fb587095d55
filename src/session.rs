// src/session.rs

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use lazy_static::lazy_static;
use polars::prelude::PolarsError;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::config::DATE_COLUMN;
use crate::dataset_loader::{DatasetLoader, DatasetSource};
use crate::observation_table::ObservationTable;

lazy_static! {
    static ref SINGLETON_SESSION: Arc<Mutex<DatasetSession>> =
        Arc::new(Mutex::new(DatasetSession::new()));
}

/// Session-wide dataset cache.
///
/// The dashboard loads its dataset once per session and reads it from every
/// chart afterwards; this session replicates that by loading each source at
/// most once, keyed by [`DatasetSource::cache_key`]. Aggregation itself never
/// caches; all memoization lives here.
pub struct DatasetSession {
    client: Client,
    cache: HashMap<String, Arc<ObservationTable>>,
}

impl DatasetSession {
    fn new() -> Self {
        DatasetSession {
            client: Client::new(),
            cache: HashMap::new(),
        }
    }

    /// Returns the cached table for `source`, loading it on first request.
    /// The dataset's date column is the configured [`DATE_COLUMN`].
    pub async fn get_or_load(
        source: &dyn DatasetSource,
    ) -> Result<Arc<ObservationTable>, PolarsError> {
        let session = Arc::clone(&SINGLETON_SESSION);
        let key = source.cache_key();

        let client = {
            let session = session.lock().await;
            if let Some(table) = session.cache.get(&key) {
                return Ok(Arc::clone(table));
            }
            session.client.clone()
        };

        // The lock is not held across the load; if two tasks race on the
        // same key, the first insert wins and the later arrival shares it.
        let table = Arc::new(DatasetLoader::load(source, &client, DATE_COLUMN).await?);

        let mut session = session.lock().await;
        let entry = session
            .cache
            .entry(key)
            .or_insert_with(|| Arc::clone(&table));
        Ok(Arc::clone(entry))
    }

    /// Loads several sources concurrently, preserving input order.
    pub async fn get_or_load_many(
        sources: &[Box<dyn DatasetSource>],
    ) -> Result<Vec<Arc<ObservationTable>>, PolarsError> {
        let futures = sources
            .iter()
            .map(|source| Self::get_or_load(source.as_ref()));
        let results = join_all(futures).await;
        results.into_iter().collect()
    }

    /// Drops every cached table.
    pub async fn clear() {
        let session = Arc::clone(&SINGLETON_SESSION);
        session.lock().await.cache.clear();
    }
}
