//! Runtime configuration.
//!
//! Each pipeline has its own section with sensible defaults. A YAML settings
//! file can override any of them, and CLI flags override the file:
//!
//! ```yaml
//! http:
//!   user_agent: "my-crawler/1.0 (+https://example.com/bot)"
//!   timeout_secs: 10
//! sitemap:
//!   max_sitemap_limit: 50
//!   output_dir: parsed_sitemaps
//! news:
//!   per_page_limit: 100
//!   total_limit: 1000
//! wiki:
//!   titles: ["Launches", "Failures"]
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Settings for the HTTP fetcher shared by all pipelines.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent identifying the crawler to the target site.
    pub user_agent: String,
    /// Per-request timeout. `None` waits as long as the transport allows.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: Some(30),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Settings for the sitemap crawler.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// How many nested sitemaps one crawl may open.
    pub max_sitemap_limit: usize,
    /// Where `export` writes one CSV per sitemap.
    pub output_dir: PathBuf,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_sitemap_limit: 20,
            output_dir: PathBuf::from("parsed_sitemaps"),
        }
    }
}

impl CrawlerConfig {
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }
}

/// Builder for [`CrawlerConfig`]
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the nested sitemap budget
    pub fn max_sitemap_limit(mut self, limit: usize) -> Self {
        self.config.max_sitemap_limit = limit;
        self
    }

    /// Set the export directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

/// Settings for the Spaceflight News API scraper.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NewsConfig {
    /// Articles endpoint; `limit` and `offset` are appended as a query string.
    pub base_url: String,
    /// Articles requested per page.
    pub per_page_limit: usize,
    /// Offsets are generated while they stay below this value.
    pub total_limit: usize,
    /// CSV file receiving every fetched record.
    pub output_file: PathBuf,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.spaceflightnewsapi.net/v4/articles/".to_string(),
            per_page_limit: 500,
            total_limit: 5000,
            output_file: PathBuf::from("spaceflight_news.csv"),
        }
    }
}

/// Settings for the wiki table parser.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WikiConfig {
    /// Titles for the tables, by position. Missing ones fall back to `Table_N`.
    pub titles: Vec<String>,
    pub output_dir: PathBuf,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            titles: Vec::new(),
            output_dir: PathBuf::from("output_data"),
        }
    }
}

/// All configuration sections, as read from a settings file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub http: HttpConfig,
    pub sitemap: CrawlerConfig,
    pub news: NewsConfig,
    pub wiki: WikiConfig,
}

impl Settings {
    /// Parse settings from YAML text. Missing keys keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).await?;
        let settings = Self::from_yaml(&text)?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }
}
