//! Laboratory record-source API client
//!
//! Read-only JSON client for the laboratory REST API: pollen-count records,
//! pool metadata and per-pool statistics. Single-dataset fetches are
//! all-or-nothing; only the global aggregation fan-out tolerates per-pool
//! failures, through the [`StatsSource`] seam.

use crate::services::global_scatter::StatsSource;
use melilab_common::models::{PollenRecord, Pool, PoolStats};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("melilab/", env!("CARGO_PKG_VERSION"));

/// Record-source client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Laboratory API client
pub struct LabClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LabClient {
    /// Create a client against the given base URL
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            base_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, "Querying laboratory API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(ClientError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// List pool metadata for every pool known to the laboratory
    pub async fn list_pools(&self) -> Result<Vec<Pool>, ClientError> {
        let pools: Vec<Pool> = self.get_json("/api/pools/", "pool list").await?;
        tracing::info!(count = pools.len(), "Retrieved pool list");
        Ok(pools)
    }

    /// List pollen-count records across all pools
    pub async fn list_records(&self) -> Result<Vec<PollenRecord>, ClientError> {
        let records: Vec<PollenRecord> =
            self.get_json("/api/pollen-records/", "pollen record list").await?;
        tracing::info!(count = records.len(), "Retrieved pollen records");
        Ok(records)
    }

    /// List pollen-count records for one pool
    pub async fn list_records_for_pool(
        &self,
        pool_id: i64,
    ) -> Result<Vec<PollenRecord>, ClientError> {
        let path = format!("/api/pollen-records/?pool={}", pool_id);
        let records: Vec<PollenRecord> = self
            .get_json(&path, &format!("records for pool {}", pool_id))
            .await?;
        tracing::info!(pool_id, count = records.len(), "Retrieved pool records");
        Ok(records)
    }

    /// Fetch aggregate statistics for one pool
    pub async fn pool_stats(&self, pool_id: i64) -> Result<PoolStats, ClientError> {
        let path = format!("/api/pools/{}/stats/", pool_id);
        self.get_json(&path, &format!("statistics for pool {}", pool_id))
            .await
    }
}

#[async_trait::async_trait]
impl StatsSource for LabClient {
    async fn fetch_pool_stats(&self, pool_id: i64) -> Result<PoolStats, ClientError> {
        self.pool_stats(pool_id).await
    }
}
