//! # Heline Core
//!
//! Pure logic shared by the heline server, crawler, and CLI: document
//! models, identity extraction from crawled URLs, code chunking, engine
//! query construction, and normalization of engine responses.
//!
//! This crate performs no network or filesystem I/O. Everything here is a
//! deterministic function of its inputs, which keeps the query and
//! normalization rules testable without a running search engine.

pub mod chunk;
pub mod domain;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod query;
