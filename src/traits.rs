//! Capability traits passed into handlers, the crawler and the CLI.
//!
//! Every outbound dependency sits behind one of these traits so the HTTP
//! API and the crawler can be driven by in-memory fakes in tests.
//!
//! ```text
//! ┌────────────┐   SearchBackend   ┌──────────────┐
//! │ server     │ ────────────────▶ │              │
//! │ crawler    │                   │  SolrClient  │ ──▶ engine HTTP API
//! │ cli search │   EngineAdmin     │              │
//! └────────────┘        ▲          └──────────────┘
//!        │              │
//!        │  IndexAdmin  │
//!        └──────▶ SchemaManager
//!
//!        IndexerApi ──▶ IndexerClient ──▶ indexing service
//! ```

use async_trait::async_trait;
use heline_core::domain::Domain;
use heline_core::query::{SelectRequest, UpdateRequest};
use serde_json::Value;

use crate::error::{EngineError, IndexerError};
use crate::indexer::{IndexResponse, JobStatus};

// ═══════════════════════════════════════════════════════════════════════
// Search engine
// ═══════════════════════════════════════════════════════════════════════

/// Query and write access to the search engine.
///
/// Implementations map a [`Domain`] to the engine core that stores it.
/// Response bodies are returned undecoded; decoding belongs to
/// [`heline_core::normalize`].
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs a select request and returns the raw response body.
    async fn select(&self, domain: &Domain, request: &SelectRequest)
        -> Result<Vec<u8>, EngineError>;

    /// Real-time get of one document by ID; returns the raw response body.
    async fn get_by_id(&self, domain: &Domain, id: &str) -> Result<Vec<u8>, EngineError>;

    /// Sends an upsert batch.
    async fn update(&self, domain: &Domain, request: &UpdateRequest) -> Result<(), EngineError>;

    /// Delay before an upserted document becomes visible, in milliseconds.
    fn commit_within_ms(&self) -> u64 {
        1000
    }
}

/// Low-level core and schema administration, one call per engine request.
#[async_trait]
pub trait EngineAdmin: Send + Sync {
    async fn core_exists(&self, core: &str) -> Result<bool, EngineError>;

    async fn create_core(&self, core: &str) -> Result<(), EngineError>;

    /// Unloads `core` and deletes its index, data and instance directories.
    async fn unload_core(&self, core: &str) -> Result<(), EngineError>;

    async fn field_exists(&self, core: &str, field: &str) -> Result<bool, EngineError>;

    /// Posts one schema mutation (`add-field-type`, `add-field`, ...).
    async fn update_schema(&self, core: &str, body: &Value) -> Result<(), EngineError>;

    /// Deletes every document in `core` and commits.
    async fn delete_all(&self, core: &str) -> Result<(), EngineError>;
}

/// Index bootstrap and reset.
#[async_trait]
pub trait IndexAdmin: Send + Sync {
    /// Creates missing cores and provisions their schema. Idempotent.
    async fn setup_schema(&self) -> Result<(), EngineError>;

    /// Deletes every code document; with `recreate_schema`, also drops the
    /// code core and runs [`setup_schema`](IndexAdmin::setup_schema).
    /// Succeeds on an engine where the code core does not exist yet.
    async fn reset_index(&self, recreate_schema: bool) -> Result<(), EngineError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Indexing service
// ═══════════════════════════════════════════════════════════════════════

/// Client of the external repository indexing service.
#[async_trait]
pub trait IndexerApi: Send + Sync {
    async fn submit(&self, git_url: &str) -> Result<IndexResponse, IndexerError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, IndexerError>;

    /// Lists jobs. An unreachable service yields an empty list.
    async fn list_jobs(&self) -> Result<Vec<JobStatus>, IndexerError>;
}
