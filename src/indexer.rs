//! REST client for the repository indexing service.
//!
//! The service clones and indexes a git repository in the background.
//! This client submits jobs and reads their status; the HTTP API forwards
//! to it unchanged.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::IndexerConfig;
use crate::error::IndexerError;
use crate::traits::IndexerApi;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub git_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub git_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct IndexerClient {
    http: reqwest::Client,
    base_url: String,
}

impl IndexerClient {
    pub fn new(config: &IndexerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.resolved_base_url().trim_end_matches('/').to_string();
        debug!(%base_url, "Indexer client configured");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    accepted: &[reqwest::StatusCode],
) -> Result<T, IndexerError> {
    let status = resp.status();
    if !accepted.contains(&status) {
        let body = resp.text().await.unwrap_or_default();
        return Err(IndexerError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl IndexerApi for IndexerClient {
    async fn submit(&self, git_url: &str) -> Result<IndexResponse, IndexerError> {
        let resp = self
            .http
            .post(format!("{}/index", self.base_url))
            .json(&IndexRequest {
                git_url: git_url.to_string(),
            })
            .send()
            .await?;
        decode(resp, &[reqwest::StatusCode::OK, reqwest::StatusCode::ACCEPTED]).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, IndexerError> {
        let resp = self
            .http
            .get(format!("{}/jobs/{}", self.base_url, job_id))
            .send()
            .await?;
        decode(resp, &[reqwest::StatusCode::OK]).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobStatus>, IndexerError> {
        let sent = self
            .http
            .get(format!("{}/jobs", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await;

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                warn!(base_url = %self.base_url, error = %e, "Indexer unreachable, returning no jobs");
                return Ok(Vec::new());
            }
        };
        decode(resp, &[reqwest::StatusCode::OK]).await
    }
}
