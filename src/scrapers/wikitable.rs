//! Wiki table parser.
//!
//! Extracts every `table.wikitable` from a page (Wikipedia and MediaWiki sites
//! mark their data tables with that class) into a [`WikiTable`].
//!
//! The first `tr` of a table supplies the header from its `th` cells; every
//! later `tr` becomes a row from its `td` cells. Cell text is trimmed. Tables
//! are made rectangular: short rows are padded with missing values and extra
//! cells get `Column_N` headers.

use crate::config::HttpConfig;
use crate::fetch::{FetchAsync, HttpFetcher};
use crate::models::{Table, WikiTable};
use crate::outputs::csv::write_tables;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.wikitable").expect("valid table selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("valid row selector"));
static HEADER_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th").expect("valid header selector"));
static DATA_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("valid cell selector"));

fn cell_texts(row: &ElementRef<'_>, selector: &Selector) -> Vec<String> {
    row.select(selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Make a rectangular [`Table`] from a header and ragged rows.
fn build_table(header: Vec<String>, data: Vec<Vec<String>>) -> Table {
    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let columns = (0..width)
        .map(|i| header.get(i).cloned().unwrap_or_else(|| format!("Column_{i}")))
        .collect();

    let rows = data
        .into_iter()
        .map(|row| row.into_iter().map(Some).pad_using(width, |_| None).collect())
        .collect();

    Table { columns, rows }
}

/// Parse every `table.wikitable` in `html`, in document order.
///
/// `titles[i]` names the i-th table; tables beyond the list stay untitled.
pub fn parse_wikitables(html: &str, titles: &[String]) -> Vec<WikiTable> {
    let document = Html::parse_document(html);

    document
        .select(&TABLE_SELECTOR)
        .enumerate()
        .map(|(position, table)| {
            let rows: Vec<ElementRef<'_>> = table.select(&ROW_SELECTOR).collect();
            let header = rows
                .first()
                .map(|row| cell_texts(row, &HEADER_CELL_SELECTOR))
                .unwrap_or_default();
            let data = rows
                .iter()
                .skip(1)
                .map(|row| cell_texts(row, &DATA_CELL_SELECTOR))
                .collect();

            WikiTable {
                title: titles.get(position).cloned(),
                position,
                table: build_table(header, data),
            }
        })
        .collect()
}

/// Fetches one wiki page and exposes its tables.
#[derive(Debug)]
pub struct WikiTableParser<F = HttpFetcher> {
    url: String,
    titles: Vec<String>,
    tables: Vec<WikiTable>,
    fetcher: F,
}

impl WikiTableParser<HttpFetcher> {
    pub fn new(
        url: impl Into<String>,
        titles: Vec<String>,
        http: &HttpConfig,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self::with_fetcher(url, titles, HttpFetcher::new(http)?))
    }
}

impl<F: FetchAsync> WikiTableParser<F> {
    pub fn with_fetcher(url: impl Into<String>, titles: Vec<String>, fetcher: F) -> Self {
        Self {
            url: url.into(),
            titles,
            tables: Vec::new(),
            fetcher,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the page and replace any previously parsed tables.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the page cannot be retrieved or answers
    /// with a non-success status.
    #[instrument(level = "info", skip(self), fields(url = %self.url))]
    pub async fn parse_tables(&mut self) -> Result<(), Box<dyn Error>> {
        let html = match self.fetcher.fetch(&self.url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, "Failed to retrieve the page");
                return Err(e);
            }
        };
        self.tables = parse_wikitables(&html, &self.titles);
        info!(count = self.tables.len(), "Parsed wiki tables");
        Ok(())
    }

    /// Tables on the page, fetching it on first use.
    pub async fn tables(&mut self) -> Result<&[WikiTable], Box<dyn Error>> {
        if self.tables.is_empty() {
            self.parse_tables().await?;
        }
        Ok(&self.tables)
    }

    /// Write the parsed tables to `{dir}/{file_stem}.csv`.
    ///
    /// Only tables already parsed are written.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let stems: Vec<String> = self.tables.iter().map(WikiTable::file_stem).collect();
        write_tables(
            dir.as_ref(),
            stems
                .iter()
                .zip(&self.tables)
                .map(|(stem, t)| (stem.as_str(), &t.table)),
        )
        .await
    }
}
