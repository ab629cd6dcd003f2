//! Repository crawler for the code-hosting site.
//!
//! Starting from `{site}/{owner}/{repo}`, the crawler walks `tree` and
//! `blob` pages of that one repository, extracts every file view it
//! reaches, and upserts the resulting documents into the code core.
//!
//! # Link policy
//!
//! A discovered link is followed only when [`is_accepted_url`] accepts it:
//! it must lie under `{repo}/tree/` or `{repo}/blob/`, must not be a
//! plain-rendered markdown view (`.md?plain=1`) and must not be a `.png`
//! or `.jpg` file. Accepted links are then resolved against the page,
//! and [`next_link`] additionally
//!
//! - drops links to a blob addressed by a full commit SHA,
//! - requests markdown files in plain mode (`?plain=1`),
//! - drops links that leave the site's origin.
//!
//! Every URL is fetched at most once per crawl (fragments ignored).
//!
//! # Failure handling
//!
//! A page that fails to fetch, or a document that fails to upsert, is
//! logged and counted in [`CrawlStats::failures`]; the crawl carries on.
//! The crawl ends when the frontier is empty or `max_pages` pages were
//! fetched.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use heline_core::domain::CODE;
use heline_core::extract::is_commit_sha;
use heline_core::models::CodeDocument;
use heline_core::query::build_update;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Config, CrawlerConfig};
use crate::page::{is_file_view, scan_page};
use crate::solr::SolrClient;
use crate::traits::SearchBackend;

/// Counters reported at the end of a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub files_indexed: usize,
    pub failures: usize,
}

/// True if `href` may be followed while crawling `repo` (`owner/name`).
pub fn is_accepted_url(href: &str, repo: &str) -> bool {
    if href.ends_with(".md?plain=1") || is_media_file(href) {
        return false;
    }
    href.contains(&format!("{}/tree/", repo)) || href.contains(&format!("{}/blob/", repo))
}

fn is_media_file(href: &str) -> bool {
    href.ends_with(".png") || href.ends_with(".jpg")
}

/// Resolves an accepted `href` found on `page` to the URL to visit next.
pub fn next_link(page: &Url, href: &str, repo: &str) -> Option<Url> {
    if !is_accepted_url(href, repo) {
        return None;
    }

    let mut link = match page.join(href) {
        Ok(link) => link,
        Err(e) => {
            warn!(href, error = %e, "Dropping unresolvable link");
            return None;
        }
    };
    link.set_fragment(None);

    if link.origin() != page.origin() {
        return None;
    }

    let segments: Vec<&str> = link
        .path()
        .split('/')
        .filter(|s| !s.trim().is_empty())
        .collect();
    if segments.len() > 3 && segments[2] == "blob" && is_commit_sha(segments[3]) {
        return None;
    }

    if link.path().ends_with(".md") && link.query().is_none() {
        link.set_query(Some("plain=1"));
    }
    Some(link)
}

pub struct Crawler {
    http: reqwest::Client,
    backend: Arc<dyn SearchBackend>,
    site: Url,
    repo: String,
    max_pages: usize,
    delay: Duration,
}

impl Crawler {
    pub fn new(config: &CrawlerConfig, repo: &str, backend: Arc<dyn SearchBackend>) -> Result<Self> {
        let repo = repo.trim().trim_matches('/');
        let parts: Vec<&str> = repo.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            bail!("Repository must be given as owner/name, got '{}'", repo);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let site = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid crawler base URL: {}", config.base_url))?;

        Ok(Self {
            http,
            backend,
            site,
            repo: repo.to_string(),
            max_pages: config.max_pages,
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// The repository root page the crawl starts from.
    pub fn start_url(&self) -> Url {
        let mut start = self.site.clone();
        start.set_path(&format!("/{}", self.repo));
        start.set_query(None);
        start
    }

    pub async fn run(&self) -> Result<CrawlStats> {
        let start = self.start_url();
        info!(repo = %self.repo, start = %start, "Crawl started");

        let mut stats = CrawlStats::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<Url> = VecDeque::new();
        seen.insert(start.to_string());
        frontier.push_back(start);

        while let Some(url) = frontier.pop_front() {
            if self.max_pages > 0 && stats.pages_visited >= self.max_pages {
                warn!(max_pages = self.max_pages, pending = frontier.len() + 1, "Page limit reached");
                break;
            }
            if !self.delay.is_zero() && stats.pages_visited > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let html = match self.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to fetch page");
                    stats.failures += 1;
                    continue;
                }
            };
            stats.pages_visited += 1;

            let scan = scan_page(&url, &html);

            if is_file_view(&url) {
                match scan.document {
                    Some(doc) => match self.upsert(&doc).await {
                        Ok(()) => {
                            stats.files_indexed += 1;
                            debug!(id = %doc.id, chunks = doc.content.len(), "Indexed file");
                        }
                        Err(e) => {
                            warn!(url = %url, error = %e, "Failed processing file");
                            stats.failures += 1;
                        }
                    },
                    None => debug!(url = %url, "File view without code table"),
                }
            }

            for href in &scan.links {
                if let Some(next) = next_link(&url, href, &self.repo) {
                    if seen.insert(next.to_string()) {
                        frontier.push_back(next);
                    }
                }
            }
        }

        info!(
            repo = %self.repo,
            pages = stats.pages_visited,
            files = stats.files_indexed,
            failures = stats.failures,
            "Crawl finished"
        );
        Ok(stats)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP {}", status);
        }
        Ok(resp.text().await?)
    }

    async fn upsert(&self, doc: &CodeDocument) -> Result<()> {
        let request = build_update(std::slice::from_ref(doc), self.backend.commit_within_ms())?;
        self.backend.update(&CODE, &request).await?;
        Ok(())
    }
}

/// `heline scrape github <owner/repo>`.
pub async fn run_scrape(config: &Config, repo: &str) -> Result<()> {
    let backend = Arc::new(SolrClient::new(&config.engine)?);
    let crawler = Crawler::new(&config.crawler, repo, backend)?;

    println!("Scraping: {}", repo);
    let stats = crawler.run().await?;
    println!(
        "Done. {} pages visited, {} files indexed, {} failures.",
        stats.pages_visited, stats.files_indexed, stats.failures
    );
    Ok(())
}
