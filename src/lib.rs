//! # heline
//!
//! Code and documentation search over a Solr engine, plus a crawler that
//! feeds source files from a code-hosting site into the index.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//! │   crawler    │──▶│ page + core  │──▶│            │
//! │ (tree/blob)  │   │ extract/chunk│   │    Solr    │
//! └──────────────┘   └──────────────┘   │ heline  /  │
//!                                       │ docset     │
//! ┌──────────────┐   ┌──────────────┐   │            │
//! │  HTTP / CLI  │──▶│ query build  │──▶│            │
//! │              │◀──│ + normalize  │◀──│            │
//! └──────────────┘   └──────────────┘   └────────────┘
//! ```
//!
//! Pure logic (identifier extraction, chunking, query building, result
//! normalization) lives in the `heline-core` crate; this crate adds the
//! HTTP clients, the API server, the crawler and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! heline setup                         # create cores and schema
//! heline scrape github acme/widget     # crawl and index a repository
//! heline search "fn main" --lang Rust  # query from the terminal
//! heline serve                         # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with environment overrides |
//! | [`error`] | Engine, indexer and HTTP error types |
//! | [`traits`] | Backend capability traits |
//! | [`solr`] | Solr HTTP client |
//! | [`admin`] | Core bootstrap, schema setup and index reset |
//! | [`search`] | Search orchestration |
//! | [`indexer`] | Indexing service client |
//! | [`page`] | HTML extraction of crawled pages |
//! | [`crawler`] | Repository crawler |
//! | [`server`] | HTTP API |

pub mod admin;
pub mod config;
pub mod crawler;
pub mod error;
pub mod indexer;
pub mod page;
pub mod search;
pub mod server;
pub mod solr;
pub mod traits;
