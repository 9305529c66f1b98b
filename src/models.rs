//! Data models shared by the scrapers.
//!
//! - [`Table`]: the flattened, column-ordered result every pipeline produces
//! - [`SiteTarget`]: root URL of a crawled site
//! - [`SitemapDocument`]: one fetched sitemap and its `<loc>` entries
//! - [`VisitBudget`]: shared cap on how many nested sitemaps a crawl may open
//! - [`WikiTable`]: a parsed wiki table with its title

use crate::utils::terminal_segment;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// A column-ordered table of optional text cells.
///
/// `None` marks a missing value. It is written as an empty cell on export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column names, in output order.
    pub columns: Vec<String>,
    /// Rows, each exactly `columns.len()` cells wide.
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of the cell at `row` in column `name`, if both exist and the cell is set.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_deref()).collect())
    }
}

/// Root URL of the site being crawled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget(String);

impl SiteTarget {
    /// Wrap a root URL without validating it.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Wrap a root URL after checking that it parses as an absolute URL.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url)?;
        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Location of the site's robots policy file.
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.0.trim_end_matches('/'))
    }
}

impl fmt::Display for SiteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Where the document was fetched from.
    pub url: String,
    /// Final path segment of `url`; used as the output file name.
    ///
    /// Two sitemaps at different paths with the same basename share an id.
    pub id: String,
    /// Text of every `<loc>` element, in document order.
    pub locs: Vec<String>,
}

impl SitemapDocument {
    pub fn new(url: &str, locs: Vec<String>) -> Self {
        Self {
            url: url.to_string(),
            id: terminal_segment(url).to_string(),
            locs,
        }
    }
}

/// Crawl-wide cap on nested sitemap visits.
///
/// The counter only ever grows. Each successful [`VisitBudget::try_acquire`]
/// admits exactly one nested document, so `used()` never exceeds `limit()`.
#[derive(Debug)]
pub struct VisitBudget {
    used: AtomicUsize,
    limit: usize,
}

impl VisitBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            used: AtomicUsize::new(0),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used() >= self.limit
    }

    /// Take one visit from the budget. Returns `false` once the cap is reached.
    pub fn try_acquire(&self) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .is_ok()
    }
}

/// One `wikitable` extracted from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiTable {
    /// Caller-supplied title, if one was given for this position.
    pub title: Option<String>,
    /// Zero-based position of the table on the page.
    pub position: usize,
    pub table: Table,
}

impl WikiTable {
    /// Human-readable title: the supplied one, or `Table N`.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Table {}", self.position + 1))
    }

    /// File stem used on export: the supplied title, or `Table_N`.
    pub fn file_stem(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Table_{}", self.position + 1))
    }
}
