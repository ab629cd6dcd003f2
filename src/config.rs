use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Environment variable overriding `engine.base_url`.
pub const ENV_SOLR_BASE_URL: &str = "SOLR_BASE_URL";
/// Environment variable overriding `indexer.base_url`.
pub const ENV_INDEXER_URL: &str = "INDEXER_URL";
/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "HELINE_BIND";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_engine_url")]
    pub base_url: String,
    #[serde(default = "default_code_core")]
    pub code_core: String,
    #[serde(default = "default_docset_core")]
    pub docset_core: String,
    #[serde(default = "default_engine_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_commit_within_ms")]
    pub commit_within_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
            code_core: default_code_core(),
            docset_core: default_docset_core(),
            timeout_secs: default_engine_timeout_secs(),
            commit_within_ms: default_commit_within_ms(),
        }
    }
}

fn default_engine_url() -> String {
    "http://localhost:8984".to_string()
}
fn default_code_core() -> String {
    heline_core::domain::CODE.default_core.to_string()
}
fn default_docset_core() -> String {
    heline_core::domain::DOCSET.default_core.to_string()
}
fn default_engine_timeout_secs() -> u64 {
    5
}
fn default_commit_within_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexerConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_indexer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_indexer_timeout_secs(),
        }
    }
}

fn default_indexer_timeout_secs() -> u64 {
    10
}

impl IndexerConfig {
    /// Configured base URL, or the container/local fallback.
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None if Path::new("/app").is_dir() => "http://heline-indexer:8080".to_string(),
            None => "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrawlerConfig {
    #[serde(default = "default_site_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Pages fetched per crawl before stopping; 0 means no limit.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub request_delay_ms: u64,
    /// Deadline for one page fetch.
    #[serde(default = "default_crawler_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_site_url(),
            user_agent: default_user_agent(),
            max_pages: default_max_pages(),
            request_delay_ms: 0,
            timeout_secs: default_crawler_timeout_secs(),
        }
    }
}

fn default_site_url() -> String {
    "https://github.com".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_max_pages() -> usize {
    5000
}
fn default_crawler_timeout_secs() -> u64 {
    30
}

/// Loads configuration from `path`, applies environment overrides and
/// validates the result. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Applies `SOLR_BASE_URL`, `INDEXER_URL` and `HELINE_BIND` from `lookup`.
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_SOLR_BASE_URL) {
        config.engine.base_url = url;
    }
    if let Some(url) = get(ENV_INDEXER_URL) {
        config.indexer.base_url = Some(url);
    }
    if let Some(bind) = get(ENV_BIND) {
        config.server.bind = bind;
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.engine.timeout_secs == 0 {
        anyhow::bail!("engine.timeout_secs must be > 0");
    }
    if config.indexer.timeout_secs == 0 {
        anyhow::bail!("indexer.timeout_secs must be > 0");
    }
    if config.crawler.timeout_secs == 0 {
        anyhow::bail!("crawler.timeout_secs must be > 0");
    }
    if config.engine.code_core.is_empty() || config.engine.docset_core.is_empty() {
        anyhow::bail!("engine.code_core and engine.docset_core must not be empty");
    }

    Url::parse(&config.engine.base_url)
        .with_context(|| format!("engine.base_url is not a valid URL: {}", config.engine.base_url))?;
    if let Some(url) = &config.indexer.base_url {
        Url::parse(url).with_context(|| format!("indexer.base_url is not a valid URL: {}", url))?;
    }
    Url::parse(&config.crawler.base_url)
        .with_context(|| format!("crawler.base_url is not a valid URL: {}", config.crawler.base_url))?;

    Ok(())
}
