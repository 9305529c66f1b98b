//! Spaceflight News API scraper.
//!
//! Reads the paginated [Spaceflight News API](https://api.spaceflightnewsapi.net)
//! article listing and flattens the `results` of every page into one table.
//!
//! # Pagination
//!
//! Page URLs are generated up front as
//! `{base_url}?limit={per_page_limit}&offset={offset}` for offsets
//! `1, 1 + per_page_limit, ...` below `total_limit`. Pages are fetched one
//! after another; a page that fails to download or decode is logged and
//! skipped.

use crate::config::{HttpConfig, NewsConfig};
use crate::fetch::{FetchAsync, HttpFetcher};
use crate::models::Table;
use crate::outputs::csv::write_table;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// One record from the API, kept as raw JSON.
pub type NewsRecord = Map<String, Value>;

/// The part of a listing page we read.
#[derive(Debug, Deserialize)]
struct ArticlePage {
    results: Vec<NewsRecord>,
}

/// Flatten records into a table.
///
/// Columns are the union of all keys in first-seen order. Strings are written
/// as-is, `null` and absent keys as missing, other scalars as their JSON text,
/// and arrays/objects as compact JSON.
pub fn flatten_records(records: &[NewsRecord]) -> Table {
    let columns: Vec<String> = records
        .iter()
        .flat_map(|record| record.keys().cloned())
        .unique()
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).and_then(cell_text))
                .collect()
        })
        .collect();

    Table { columns, rows }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Fetches article listings from the Spaceflight News API.
#[derive(Debug)]
pub struct SpaceflightNewsScraper<F = HttpFetcher> {
    config: NewsConfig,
    fetcher: F,
}

impl SpaceflightNewsScraper<HttpFetcher> {
    pub fn new(config: NewsConfig, http: &HttpConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self::with_fetcher(config, HttpFetcher::new(http)?))
    }
}

impl<F: FetchAsync> SpaceflightNewsScraper<F> {
    pub fn with_fetcher(config: NewsConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    /// URLs of every page to request, in order.
    pub fn page_urls(&self) -> Vec<String> {
        let per_page = self.config.per_page_limit;
        if per_page == 0 {
            warn!("per_page_limit is 0; no pages to request");
            return Vec::new();
        }
        (1..self.config.total_limit)
            .step_by(per_page)
            .map(|offset| {
                format!(
                    "{}?limit={}&offset={}",
                    self.config.base_url, per_page, offset
                )
            })
            .collect()
    }

    /// Fetch every page and collect the records, skipping pages that fail.
    #[instrument(level = "info", skip(self), fields(base_url = %self.config.base_url))]
    pub async fn scrape(&self) -> Vec<NewsRecord> {
        let urls = self.page_urls();
        let pages = urls.len();

        let records: Vec<NewsRecord> = stream::iter(urls)
            .then(|url: String| async move {
                match self.fetch_page(&url).await {
                    Ok(records) => {
                        debug!(%url, count = records.len(), "Fetched news page");
                        records
                    }
                    Err(e) => {
                        error!(%url, error = %e, "Failed to retrieve news page");
                        Vec::new()
                    }
                }
            })
            .flat_map(stream::iter)
            .collect()
            .await;

        info!(pages, count = records.len(), "Fetched news records");
        records
    }

    /// [`scrape`](Self::scrape) and flatten the result.
    pub async fn scrape_table(&self) -> Table {
        flatten_records(&self.scrape().await)
    }

    /// Scrape and write the table to the configured output file.
    pub async fn scrape_to_csv(&self) -> Result<Table, Box<dyn Error>> {
        let table = self.scrape_table().await;
        let path: &Path = &self.config.output_file;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_table(&table, path).await?;
        info!(path = %path.display(), rows = table.len(), "Wrote news CSV");
        Ok(table)
    }

    async fn fetch_page(&self, url: &str) -> Result<Vec<NewsRecord>, Box<dyn Error>> {
        let body = self.fetcher.fetch(url).await?;
        match serde_json::from_str::<ArticlePage>(&body) {
            Ok(page) => Ok(page.results),
            Err(e) => {
                warn!(
                    %url,
                    body_preview = %truncate_for_log(&body, 200),
                    "News page is not a results listing"
                );
                Err(e.into())
            }
        }
    }
}
