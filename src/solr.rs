//! HTTP client for the Solr search engine.
//!
//! Implements [`SearchBackend`] (select, real-time get, update) and
//! [`EngineAdmin`] (cores admin API, schema API, delete-all) on top of one
//! shared `reqwest::Client` with a per-request timeout.
//!
//! | Operation     | Request                                                     |
//! |---------------|-------------------------------------------------------------|
//! | select        | `POST /solr/{core}/select?hl=on&...` with JSON query body   |
//! | get by ID     | `GET /solr/{core}/get?ids={id}`                             |
//! | update        | `POST /solr/{core}/update?commitWithin=..&overwrite=true`   |
//! | core status   | `GET /solr/admin/cores?action=STATUS&core={core}`           |
//! | create core   | `GET /solr/admin/cores?action=CREATE&name={core}&...`       |
//! | unload core   | `GET /solr/admin/cores?action=UNLOAD&core={core}&delete...` |
//! | field check   | `GET /solr/{core}/schema/fields/{field}`                    |
//! | schema change | `POST /solr/{core}/schema`                                  |

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use heline_core::domain::Domain;
use heline_core::query::{self, SelectRequest, UpdateRequest};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::traits::{EngineAdmin, SearchBackend};

pub struct SolrClient {
    http: reqwest::Client,
    base_url: String,
    code_core: String,
    docset_core: String,
    commit_within_ms: u64,
}

impl SolrClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            code_core: config.code_core.clone(),
            docset_core: config.docset_core.clone(),
            commit_within_ms: config.commit_within_ms,
        })
    }

    /// Configured core for `domain`; unknown domains use their default core.
    pub fn core_for(&self, domain: &Domain) -> &str {
        if domain.name == heline_core::domain::CODE.name {
            &self.code_core
        } else if domain.name == heline_core::domain::DOCSET.name {
            &self.docset_core
        } else {
            domain.default_core
        }
    }

    fn core_url(&self, core: &str, path: &str) -> String {
        format!("{}/solr/{}/{}", self.base_url, core, path)
    }

    fn cores_admin_url(&self) -> String {
        format!("{}/solr/admin/cores", self.base_url)
    }

    async fn cores_admin(&self, params: &[(&str, &str)]) -> Result<Vec<u8>, EngineError> {
        let resp = self.http.get(self.cores_admin_url()).query(params).send().await?;
        read_body(resp).await
    }
}

/// Returns the body of a successful response, or the status and body text
/// of a failed one.
async fn read_body(resp: reqwest::Response) -> Result<Vec<u8>, EngineError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(EngineError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.bytes().await?.to_vec())
}

#[async_trait]
impl SearchBackend for SolrClient {
    async fn select(
        &self,
        domain: &Domain,
        request: &SelectRequest,
    ) -> Result<Vec<u8>, EngineError> {
        let url = self.core_url(self.core_for(domain), "select");
        debug!(%url, body = %request.body, "engine select");

        let resp = self
            .http
            .post(&url)
            .query(&request.params)
            .json(&request.body)
            .send()
            .await?;
        read_body(resp).await
    }

    async fn get_by_id(&self, domain: &Domain, id: &str) -> Result<Vec<u8>, EngineError> {
        let url = self.core_url(self.core_for(domain), "get");
        debug!(%url, id, "engine get");

        let resp = self.http.get(&url).query(&[("ids", id)]).send().await?;
        read_body(resp).await
    }

    async fn update(&self, domain: &Domain, request: &UpdateRequest) -> Result<(), EngineError> {
        let url = self.core_url(self.core_for(domain), "update");
        let resp = self
            .http
            .post(&url)
            .query(&request.params)
            .json(&request.body)
            .send()
            .await?;
        read_body(resp).await?;
        Ok(())
    }

    fn commit_within_ms(&self) -> u64 {
        self.commit_within_ms
    }
}

#[async_trait]
impl EngineAdmin for SolrClient {
    async fn core_exists(&self, core: &str) -> Result<bool, EngineError> {
        let body = self
            .cores_admin(&[("action", "STATUS"), ("core", core)])
            .await?;
        let json: Value = serde_json::from_slice(&body)?;
        Ok(core_present(&json, core))
    }

    async fn create_core(&self, core: &str) -> Result<(), EngineError> {
        debug!(core, "creating core");
        self.cores_admin(&[
            ("action", "CREATE"),
            ("name", core),
            ("instanceDir", core),
            ("config", "solrconfig.xml"),
            ("dataDir", "data"),
        ])
        .await?;
        Ok(())
    }

    async fn unload_core(&self, core: &str) -> Result<(), EngineError> {
        debug!(core, "unloading core");
        self.cores_admin(&[
            ("action", "UNLOAD"),
            ("core", core),
            ("deleteIndex", "true"),
            ("deleteDataDir", "true"),
            ("deleteInstanceDir", "true"),
        ])
        .await?;
        Ok(())
    }

    async fn field_exists(&self, core: &str, field: &str) -> Result<bool, EngineError> {
        let url = self.core_url(core, &format!("schema/fields/{}", field));
        let resp = self.http.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        read_body(resp).await?;
        Ok(true)
    }

    async fn update_schema(&self, core: &str, body: &Value) -> Result<(), EngineError> {
        let url = self.core_url(core, "schema");
        let resp = self.http.post(&url).json(body).send().await?;
        let bytes = read_body(resp).await?;

        // The schema API reports per-command failures with a 200 status.
        if let Ok(json) = serde_json::from_slice::<Value>(&bytes) {
            if let Some(errors) = json.get("error") {
                return Err(EngineError::Status {
                    status: 200,
                    body: errors.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn delete_all(&self, core: &str) -> Result<(), EngineError> {
        let url = self.core_url(core, "update");
        let resp = self
            .http
            .post(&url)
            .json(&query::delete_all_body())
            .send()
            .await?;
        read_body(resp).await?;
        Ok(())
    }
}

/// True if a cores STATUS response describes `core` as loaded.
///
/// Solr answers STATUS for an unknown core with an empty object under
/// `status.{core}`.
pub fn core_present(status: &Value, core: &str) -> bool {
    status
        .get("status")
        .and_then(|s| s.get(core))
        .and_then(|c| c.as_object())
        .is_some_and(|c| !c.is_empty())
}
