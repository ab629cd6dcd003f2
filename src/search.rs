//! Search orchestration: build the engine request, send it, normalize.
//!
//! Shared by the HTTP API and `heline search`.

use anyhow::Result;
use heline_core::domain::{Domain, CODE, DOCSET};
use heline_core::models::{DocsetDetail, QueryFilters, SearchQuery};
use heline_core::normalize::{self, SearchHits};
use heline_core::query::build_select;
use tracing::debug;

use crate::config::Config;
use crate::error::EngineError;
use crate::solr::SolrClient;
use crate::traits::SearchBackend;

/// Runs `query` against `domain` and returns the normalized result.
pub async fn search(
    backend: &dyn SearchBackend,
    domain: &Domain,
    query: &SearchQuery,
) -> Result<SearchHits, EngineError> {
    let request = build_select(domain, query);
    debug!(
        domain = domain.name,
        original = %query.raw_text,
        engine_query = %request.query,
        highlight_query = %request.highlight_query,
        filters = ?request.filters,
        "Built search query"
    );

    let body = backend.select(domain, &request).await?;
    let hits = normalize::normalize(domain, &body)?;
    debug!(
        domain = domain.name,
        total = hits.total,
        returned = hits.hits.len(),
        "Search complete"
    );
    Ok(hits)
}

/// Looks up one docset entry by ID.
pub async fn get_docset(
    backend: &dyn SearchBackend,
    id: &str,
) -> Result<Option<DocsetDetail>, EngineError> {
    let body = backend.get_by_id(&DOCSET, id).await?;
    Ok(normalize::first_document(&body)?)
}

/// `heline search`: prints the normalized result as JSON.
pub async fn run_search(
    config: &Config,
    text: &str,
    filters: QueryFilters,
    docs: bool,
) -> Result<()> {
    if text.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let client = SolrClient::new(&config.engine)?;
    let domain = if docs { &DOCSET } else { &CODE };
    let query = SearchQuery::new(text).with_filters(filters);

    let hits = search(&client, domain, &query).await?;
    if hits.hits.is_empty() {
        println!("No results. (engine reported {} matches)", hits.total);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
