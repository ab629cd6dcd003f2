//! # heline CLI
//!
//! ## Usage
//!
//! ```bash
//! heline --config ./config/heline.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `heline serve` | Start the HTTP API |
//! | `heline scrape github <owner/repo>` | Crawl a repository and index its files |
//! | `heline setup` | Create missing cores and provision their schema |
//! | `heline reset [--recreate-schema]` | Delete all code documents |
//! | `heline search "<query>"` | Search from the terminal |
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use heline::traits::IndexAdmin;
use heline::{admin, config, crawler, search, server, solr};
use heline_core::models::QueryFilters;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// heline: code search over Solr with a repository crawler.
#[derive(Parser)]
#[command(name = "heline", version, about = "Code and documentation search over Solr")]
struct Cli {
    /// Path to configuration file (TOML). A missing file means defaults.
    #[arg(long, global = true, default_value = "./config/heline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve,

    /// Crawl a site and index what it finds.
    Scrape {
        #[command(subcommand)]
        source: ScrapeSource,
    },

    /// Create missing cores and provision their schema. Safe to repeat.
    Setup,

    /// Delete every document in the code core.
    Reset {
        /// Also drop the code core and recreate it with a fresh schema.
        #[arg(long)]
        recreate_schema: bool,
    },

    /// Search the index and print the normalized result.
    Search {
        /// The search query string.
        query: String,

        /// Language filter; may repeat.
        #[arg(long = "lang")]
        lang: Vec<String>,

        /// Repository filter (`owner/name`); may repeat.
        #[arg(long)]
        repo: Vec<String>,

        /// Path filter; `*` and `?` act as wildcards. May repeat.
        #[arg(long)]
        path: Vec<String>,

        /// Search the documentation sets instead of code.
        #[arg(long)]
        docs: bool,
    },
}

#[derive(Subcommand)]
enum ScrapeSource {
    /// Crawl one repository on the code-hosting site.
    Github {
        /// Repository as `owner/name`.
        repo: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Scrape {
            source: ScrapeSource::Github { repo },
        } => {
            crawler::run_scrape(&cfg, &repo).await?;
        }
        Commands::Setup => {
            let engine = Arc::new(solr::SolrClient::new(&cfg.engine)?);
            admin::SchemaManager::new(engine, &cfg.engine)
                .setup_schema()
                .await?;
            println!("Schema setup complete.");
        }
        Commands::Reset { recreate_schema } => {
            let engine = Arc::new(solr::SolrClient::new(&cfg.engine)?);
            admin::SchemaManager::new(engine, &cfg.engine)
                .reset_index(recreate_schema)
                .await?;
            println!("Index reset successful.");
        }
        Commands::Search {
            query,
            lang,
            repo,
            path,
            docs,
        } => {
            let filters = QueryFilters {
                repo,
                language: lang,
                path,
            };
            search::run_search(&cfg, &query, filters, docs).await?;
        }
    }

    Ok(())
}
