//! Split sitemap URLs into positional path columns.
//!
//! Every URL is reduced to its path relative to the site root and split on
//! `/`. The deepest URL in the list decides how many `Level_N` columns the
//! table gets; shallower URLs leave their trailing levels empty.

use crate::models::Table;
use itertools::Itertools;
use std::iter;

/// Name of the column holding the original URL.
pub const URL_COLUMN: &str = "URLs";

/// Name of the column for path depth `depth` (zero-based).
pub fn level_column(depth: usize) -> String {
    format!("Level_{depth}")
}

/// Path segments of `url` below `site`.
///
/// The site prefix is removed if present, surrounding slashes are trimmed,
/// and the remainder is split on `/`. The site root itself yields one empty
/// segment.
pub fn split_url_path<'a>(url: &'a str, site: &str) -> Vec<&'a str> {
    url.strip_prefix(site)
        .unwrap_or(url)
        .trim_matches('/')
        .split('/')
        .collect()
}

/// Build the `URLs` + `Level_0..Level_{max_depth-1}` table for one document.
///
/// Row order follows `urls`. An empty list yields a table with only the
/// `URLs` column and no rows.
pub fn decompose<S: AsRef<str>>(urls: &[S], site: &str) -> Table {
    let segments: Vec<Vec<&str>> = urls
        .iter()
        .map(|url| split_url_path(url.as_ref(), site))
        .collect();
    let max_depth = segments.iter().map(Vec::len).max().unwrap_or(0);

    let columns = iter::once(URL_COLUMN.to_string())
        .chain((0..max_depth).map(level_column))
        .collect();

    let rows = urls
        .iter()
        .zip(&segments)
        .map(|(url, segs)| {
            iter::once(Some(url.as_ref().to_string()))
                .chain(
                    segs.iter()
                        .map(|s| Some(s.to_string()))
                        .pad_using(max_depth, |_| None),
                )
                .collect()
        })
        .collect();

    Table { columns, rows }
}
