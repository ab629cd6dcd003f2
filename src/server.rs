//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/search` | Code search; `tbm=docs` switches to docset search, `tbm=docs&id=X` fetches one docset entry |
//! | `POST` | `/api/index` | Submit a repository to the indexing service |
//! | `GET`  | `/api/index/status/{job_id}` | Status of one indexing job |
//! | `GET`  | `/api/index/jobs` | All indexing jobs; empty when the service is unreachable |
//! | `POST` | `/api/index/reset` | Delete all code documents, optionally recreating the schema |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Search parameters
//!
//! `q` is the query text. Filters are given as `filter[lang]`,
//! `filter[path]` and `filter[repo]`; each may repeat and each value may
//! hold several comma-separated entries.
//!
//! ```text
//! GET /api/search?q=fn%20main&filter[lang]=Rust&filter[repo]=acme/widget
//! ```
//!
//! # Error contract
//!
//! ```json
//! { "error": "Failed to reset index", "details": "engine returned 503: ..." }
//! ```
//!
//! # CORS
//!
//! Any origin; methods `GET, POST, PATCH, DELETE, OPTIONS`; headers
//! `Content-Type, Authorization, Accept`; preflight cached for 300 seconds.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use heline_core::domain::{CODE, DOCSET};
use heline_core::models::{QueryFilters, SearchQuery};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::admin::SchemaManager;
use crate::config::Config;
use crate::error::ApiError;
use crate::indexer::{IndexRequest, IndexResponse, IndexerClient, JobStatus};
use crate::search;
use crate::solr::SolrClient;
use crate::traits::{IndexAdmin, IndexerApi, SearchBackend};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub admin: Arc<dyn IndexAdmin>,
    pub indexer: Arc<dyn IndexerApi>,
}

impl AppState {
    /// Wires the Solr client and indexer client described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let solr = Arc::new(SolrClient::new(&config.engine)?);
        let admin = SchemaManager::new(solr.clone(), &config.engine);
        let indexer = IndexerClient::new(&config.indexer)?;
        info!(indexer = %indexer.base_url(), engine = %config.engine.base_url, "Backends configured");

        Ok(Self {
            backend: solr,
            admin: Arc::new(admin),
            indexer: Arc::new(indexer),
        })
    }
}

/// Builds the API router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(300));

    Router::new()
        .route("/api/search", get(handle_search))
        .route("/api/index", post(handle_index))
        .route("/api/index/status/{job_id}", get(handle_job_status))
        .route("/api/index/jobs", get(handle_list_jobs))
        .route("/api/index/reset", post(handle_reset))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/search ============

/// Parsed `/api/search` query string.
#[derive(Debug, Default, PartialEq)]
pub struct SearchParams {
    pub q: String,
    pub tbm: Option<String>,
    pub id: Option<String>,
    pub filters: QueryFilters,
}

impl SearchParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = SearchParams::default();
        for (key, value) in pairs {
            let list = match key.as_str() {
                "q" => {
                    params.q = value.clone();
                    continue;
                }
                "tbm" => {
                    params.tbm = Some(value.clone()).filter(|v| !v.is_empty());
                    continue;
                }
                "id" => {
                    params.id = Some(value.clone()).filter(|v| !v.is_empty());
                    continue;
                }
                "filter[lang]" => &mut params.filters.language,
                "filter[path]" => &mut params.filters.path,
                "filter[repo]" => &mut params.filters.repo,
                _ => continue,
            };
            list.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        }
        params
    }

    fn is_docs(&self) -> bool {
        self.tbm.as_deref() == Some("docs")
    }
}

async fn handle_search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let params = SearchParams::from_pairs(&pairs);

    if params.is_docs() {
        if let Some(id) = &params.id {
            let doc = search::get_docset(state.backend.as_ref(), id)
                .await
                .map_err(ApiError::Search)?
                .ok_or_else(|| ApiError::NotFound(format!("{} not found!", id)))?;
            return Ok(Json(doc).into_response());
        }

        let query = SearchQuery::new(params.q.as_str());
        let hits = search::search(state.backend.as_ref(), &DOCSET, &query)
            .await
            .map_err(ApiError::Search)?;
        return Ok(Json(json!({ "docs": hits })).into_response());
    }

    let query = SearchQuery::new(params.q.as_str()).with_filters(params.filters);
    let hits = search::search(state.backend.as_ref(), &CODE, &query)
        .await
        .map_err(ApiError::Search)?;
    Ok(Json(json!({ "hits": hits })).into_response())
}

// ============ /api/index ============

async fn handle_index(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IndexResponse>, ApiError> {
    let request: IndexRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))?;
    let git_url = request.git_url.trim();
    if git_url.is_empty() {
        return Err(ApiError::BadRequest("git_url must not be empty".to_string()));
    }

    info!(git_url, "Submitting repository for indexing");
    Ok(Json(state.indexer.submit(git_url).await?))
}

async fn handle_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    Ok(Json(state.indexer.job_status(&job_id).await?))
}

async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobStatus>>, ApiError> {
    Ok(Json(state.indexer.list_jobs().await?))
}

// ============ POST /api/index/reset ============

#[derive(Debug, Default, Deserialize)]
struct ResetRequest {
    #[serde(default)]
    recreate_schema: bool,
}

async fn handle_reset(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    // An empty or malformed body means a plain reset.
    let request: ResetRequest = serde_json::from_slice(&body).unwrap_or_default();

    state
        .admin
        .reset_index(request.recreate_schema)
        .await
        .map_err(ApiError::Reset)?;

    Ok(Json(json!({
        "success": true,
        "message": "Index reset successful",
        "details": { "recreate_schema": request.recreate_schema },
    })))
}
