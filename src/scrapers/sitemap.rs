//! Sitemap crawler.
//!
//! Starts from the sitemaps a site declares in `robots.txt` and walks nested
//! sitemap indexes depth-first. Every visited document becomes one
//! [`Table`] of its `<loc>` URLs, split into `Level_N` path columns, keyed by
//! the document's basename.
//!
//! # Traversal
//!
//! Nesting is followed with an explicit stack of frames, one per open
//! document, each holding the `<loc>` entries not yet looked at. An entry
//! ending in `.xml` is opened as soon as it is reached, before its later
//! siblings, so the visit order matches a recursive depth-first walk.
//!
//! A single [`VisitBudget`] is shared by the whole crawl. Each nested document
//! takes one unit before it is fetched; once the budget is spent, remaining
//! `.xml` entries are left alone and further top-level sitemaps are skipped.
//! Nothing else stops cycles.
//!
//! # Failures
//!
//! Fetch failures and unparsable XML yield a document with no entries, which
//! is still recorded as a zero-row table.

use crate::config::{CrawlerConfig, HttpConfig};
use crate::decompose::decompose;
use crate::fetch::{FetchAsync, HttpFetcher, fetch_or_empty};
use crate::models::{SiteTarget, SitemapDocument, Table, VisitBudget};
use crate::outputs::csv::write_tables;
use crate::scrapers::robots::declared_sitemaps;
use crate::utils::is_nested_sitemap;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Text of every `<loc>` element in `xml`, in document order.
///
/// Namespace prefixes are ignored, entities are unescaped and CDATA is kept
/// verbatim. Values are trimmed. On malformed input the entries read before
/// the error are returned.
pub fn extract_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                current = Some(String::new());
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"loc" => {
                locs.push(String::new());
            }
            Ok(Event::Text(e)) => {
                if let Some(buf) = current.as_mut() {
                    match e.unescape() {
                        Ok(text) => buf.push_str(&text),
                        Err(_) => buf.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                if let Some(buf) = current.take() {
                    locs.push(buf.trim().to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(
                    position = reader.buffer_position(),
                    error = %e,
                    kept = locs.len(),
                    "Malformed sitemap XML; keeping entries read so far"
                );
                break;
            }
            _ => {}
        }
    }

    locs
}

/// Tables produced by one crawl.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// One table per sitemap id. A later document with the same id replaces
    /// the earlier one.
    pub records: BTreeMap<String, Table>,
    /// Every sitemap URL visited, in visit order.
    pub visited: Vec<String>,
}

impl CrawlReport {
    fn record(&mut self, document: &SitemapDocument, table: Table) {
        if self.records.insert(document.id.clone(), table).is_some() {
            warn!(
                sitemap_id = %document.id,
                url = %document.url,
                "Sitemap id already recorded; replacing earlier table"
            );
        }
        self.visited.push(document.url.clone());
    }

    pub fn get(&self, sitemap_id: &str) -> Option<&Table> {
        self.records.get(sitemap_id)
    }

    /// Number of distinct sitemap ids recorded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every table to `{dir}/{sitemap_id}.csv`.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        write_tables(
            dir.as_ref(),
            self.records.iter().map(|(id, table)| (id.as_str(), table)),
        )
        .await
    }
}

/// Crawls the sitemaps of one site.
///
/// Construction does no I/O; call [`SitemapCrawler::crawl`] to run.
#[derive(Debug)]
pub struct SitemapCrawler<F = HttpFetcher> {
    site: SiteTarget,
    config: CrawlerConfig,
    fetcher: F,
}

impl SitemapCrawler<HttpFetcher> {
    /// Create a crawler that fetches over HTTP.
    pub fn new(
        site: SiteTarget,
        config: CrawlerConfig,
        http: &HttpConfig,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self::with_fetcher(site, config, HttpFetcher::new(http)?))
    }
}

impl<F: FetchAsync> SitemapCrawler<F> {
    /// Create a crawler around any [`FetchAsync`] implementation.
    pub fn with_fetcher(site: SiteTarget, config: CrawlerConfig, fetcher: F) -> Self {
        Self {
            site,
            config,
            fetcher,
        }
    }

    pub fn site(&self) -> &SiteTarget {
        &self.site
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Discover sitemaps in `robots.txt` and visit each of them.
    ///
    /// Never fails: unreachable resources just contribute nothing.
    #[instrument(level = "info", skip(self), fields(site = %self.site))]
    pub async fn crawl(&self) -> CrawlReport {
        let budget = VisitBudget::new(self.config.max_sitemap_limit);
        let mut report = CrawlReport::default();

        let robots_txt = fetch_or_empty(&self.fetcher, &self.site.robots_url()).await;
        let declared = declared_sitemaps(&robots_txt);
        info!(count = declared.len(), "Discovered sitemaps in robots.txt");

        for sitemap_url in &declared {
            self.visit(sitemap_url, &budget, &mut report).await;
        }

        info!(
            visited = report.visited.len(),
            tables = report.len(),
            budget_used = budget.used(),
            budget_limit = budget.limit(),
            "Sitemap crawl complete"
        );
        report
    }

    /// Visit `sitemap_url` and everything nested below it, depth-first.
    ///
    /// Does nothing if `budget` is already exhausted. The top-level document
    /// does not consume budget; each nested one consumes one unit.
    #[instrument(level = "info", skip(self, budget, report))]
    pub async fn visit(&self, sitemap_url: &str, budget: &VisitBudget, report: &mut CrawlReport) {
        if budget.is_exhausted() {
            debug!(used = budget.used(), "Visit budget exhausted; skipping");
            return;
        }

        let root = self.load(sitemap_url, report).await;
        let mut stack = vec![root.into_iter()];

        while let Some(frame) = stack.last_mut() {
            let Some(loc) = frame.next() else {
                stack.pop();
                continue;
            };
            if !is_nested_sitemap(&loc) || !budget.try_acquire() {
                continue;
            }
            let nested = self.load(&loc, report).await;
            stack.push(nested.into_iter());
        }
    }

    /// Fetch, parse and record one document; returns its `<loc>` entries.
    async fn load(&self, url: &str, report: &mut CrawlReport) -> Vec<String> {
        let xml = fetch_or_empty(&self.fetcher, url).await;
        let document = SitemapDocument::new(url, extract_locs(&xml));
        let table = decompose(&document.locs, self.site.as_str());
        info!(
            %url,
            sitemap_id = %document.id,
            urls = table.len(),
            levels = table.columns.len() - 1,
            "Parsed sitemap"
        );
        report.record(&document, table);
        document.locs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    const SITE: &str = "https://ex.com";

    fn urlset(locs: &[&str]) -> String {
        let entries: String = locs
            .iter()
            .map(|l| format!("<url><loc>{l}</loc></url>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
        )
    }

    fn index(locs: &[&str]) -> String {
        let entries: String = locs
            .iter()
            .map(|l| format!("<sitemap><loc>{l}</loc></sitemap>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#
        )
    }

    fn crawler(fetcher: StaticFetcher, limit: usize) -> SitemapCrawler<StaticFetcher> {
        SitemapCrawler::with_fetcher(
            SiteTarget::new(SITE),
            CrawlerConfig::builder().max_sitemap_limit(limit).build(),
            fetcher,
        )
    }

    #[test]
    fn test_extract_locs_urlset() {
        let xml = urlset(&["https://ex.com/a", "https://ex.com/b/c"]);
        assert_eq!(extract_locs(&xml), vec!["https://ex.com/a", "https://ex.com/b/c"]);
    }

    #[test]
    fn test_extract_locs_prefixed_entities_and_cdata() {
        let xml = r#"<s:urlset xmlns:s="http://www.sitemaps.org/schemas/sitemap/0.9">
            <s:url><s:loc>
                https://ex.com/search?q=a&amp;page=2
            </s:loc></s:url>
            <s:url><s:loc><![CDATA[https://ex.com/raw&path]]></s:loc></s:url>
            <s:url><s:lastmod>2024-01-01</s:lastmod></s:url>
        </s:urlset>"#;
        assert_eq!(
            extract_locs(xml),
            vec!["https://ex.com/search?q=a&page=2", "https://ex.com/raw&path"]
        );
    }

    #[test]
    fn test_extract_locs_malformed_keeps_prefix() {
        let xml = "<urlset><url><loc>https://ex.com/a</loc></url><url><loc>https://ex.com/b</oops></url>";
        assert_eq!(extract_locs(xml), vec!["https://ex.com/a"]);
    }

    #[test]
    fn test_extract_locs_not_xml() {
        assert!(extract_locs("").is_empty());
        assert!(extract_locs("just some text").is_empty());
    }

    #[tokio::test]
    async fn test_crawl_from_robots() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://ex.com/robots.txt",
                "User-agent: *\nSitemap: https://ex.com/sitemap_index.xml\n",
            )
            .with_page(
                "https://ex.com/sitemap_index.xml",
                &index(&["https://ex.com/post-sitemap.xml"]),
            )
            .with_page(
                "https://ex.com/post-sitemap.xml",
                &urlset(&["https://ex.com/blog/hello", "https://ex.com/about"]),
            );

        let report = crawler(fetcher, 20).crawl().await;

        assert_eq!(
            report.visited,
            vec!["https://ex.com/sitemap_index.xml", "https://ex.com/post-sitemap.xml"]
        );
        let index_table = report.get("sitemap_index.xml").unwrap();
        assert_eq!(index_table.columns, vec!["URLs", "Level_0"]);
        assert_eq!(index_table.cell(0, "Level_0"), Some("post-sitemap.xml"));

        let posts = report.get("post-sitemap.xml").unwrap();
        assert_eq!(posts.columns, vec!["URLs", "Level_0", "Level_1"]);
        assert_eq!(posts.cell(0, "Level_1"), Some("hello"));
        assert_eq!(posts.cell(1, "Level_0"), Some("about"));
        assert_eq!(posts.cell(1, "Level_1"), None);
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        let fetcher = StaticFetcher::new()
            .with_page("https://ex.com/a.xml", &index(&["https://ex.com/b.xml", "https://ex.com/c.xml"]))
            .with_page("https://ex.com/b.xml", &index(&["https://ex.com/d.xml"]))
            .with_page("https://ex.com/c.xml", &urlset(&["https://ex.com/page-c"]))
            .with_page("https://ex.com/d.xml", &urlset(&["https://ex.com/page-d"]));
        let crawler = crawler(fetcher, 20);
        let budget = VisitBudget::new(20);
        let mut report = CrawlReport::default();

        crawler.visit("https://ex.com/a.xml", &budget, &mut report).await;

        assert_eq!(
            report.visited,
            vec![
                "https://ex.com/a.xml",
                "https://ex.com/b.xml",
                "https://ex.com/d.xml",
                "https://ex.com/c.xml",
            ]
        );
        assert_eq!(crawler.fetcher().requests(), report.visited);
        assert_eq!(budget.used(), 3);
    }

    #[tokio::test]
    async fn test_same_basename_last_write_wins() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://ex.com/index.xml",
                &index(&["https://ex.com/a/sitemap.xml", "https://ex.com/b/sitemap.xml"]),
            )
            .with_page("https://ex.com/a/sitemap.xml", &urlset(&["https://ex.com/from-a"]))
            .with_page("https://ex.com/b/sitemap.xml", &urlset(&["https://ex.com/from-b/x"]));
        let crawler = crawler(fetcher, 20);
        let budget = VisitBudget::new(20);
        let mut report = CrawlReport::default();

        crawler.visit("https://ex.com/index.xml", &budget, &mut report).await;

        assert_eq!(report.visited.len(), 3);
        assert_eq!(report.len(), 2);
        let table = report.get("sitemap.xml").unwrap();
        assert_eq!(table.cell(0, "URLs"), Some("https://ex.com/from-b/x"));
    }

    #[tokio::test]
    async fn test_budget_limits_nested_visits() {
        let children: Vec<String> = (1..=5).map(|i| format!("https://ex.com/child-{i}.xml")).collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
        let mut fetcher = StaticFetcher::new().with_page("https://ex.com/root.xml", &index(&child_refs));
        for child in &children {
            fetcher = fetcher.with_page(child, &urlset(&["https://ex.com/page"]));
        }
        let crawler = crawler(fetcher, 2);
        let budget = VisitBudget::new(2);
        let mut report = CrawlReport::default();

        crawler.visit("https://ex.com/root.xml", &budget, &mut report).await;

        assert_eq!(
            report.visited,
            vec![
                "https://ex.com/root.xml",
                "https://ex.com/child-1.xml",
                "https://ex.com/child-2.xml",
            ]
        );
        assert_eq!(budget.used(), 2);
    }

    #[tokio::test]
    async fn test_cycles_are_bounded_by_budget() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://ex.com/loop.xml",
                &index(&["https://ex.com/loop.xml", "https://ex.com/other.xml"]),
            )
            .with_page("https://ex.com/other.xml", &index(&["https://ex.com/loop.xml"]));
        let crawler = crawler(fetcher, 4);
        let budget = VisitBudget::new(4);
        let mut report = CrawlReport::default();

        crawler.visit("https://ex.com/loop.xml", &budget, &mut report).await;

        assert_eq!(budget.used(), 4);
        assert!(budget.used() <= budget.limit());
        assert_eq!(report.visited.len(), 5);
        assert!(report.visited.iter().all(|u| u == "https://ex.com/loop.xml"));
    }

    #[tokio::test]
    async fn test_page_urls_never_spend_budget() {
        let fetcher = StaticFetcher::new().with_page(
            "https://ex.com/sitemap.xml",
            &urlset(&["https://ex.com/a", "https://ex.com/feed.rss", "https://ex.com/b/"]),
        );
        let crawler = crawler(fetcher, 20);
        let budget = VisitBudget::new(20);
        let mut report = CrawlReport::default();

        crawler.visit("https://ex.com/sitemap.xml", &budget, &mut report).await;

        assert_eq!(budget.used(), 0);
        assert_eq!(crawler.fetcher().requests(), vec!["https://ex.com/sitemap.xml"]);
    }

    #[tokio::test]
    async fn test_exhausted_budget_skips_top_level_visit() {
        let crawler = crawler(StaticFetcher::new(), 1);
        let budget = VisitBudget::new(1);
        assert!(budget.try_acquire());
        let mut report = CrawlReport::default();

        crawler.visit("https://ex.com/sitemap.xml", &budget, &mut report).await;

        assert!(report.is_empty());
        assert!(crawler.fetcher().requests().is_empty());
    }

    #[tokio::test]
    async fn test_budget_is_shared_across_declared_sitemaps() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://ex.com/robots.txt",
                "Sitemap: https://ex.com/first.xml\nSitemap: https://ex.com/second.xml\n",
            )
            .with_page("https://ex.com/first.xml", &index(&["https://ex.com/nested.xml"]))
            .with_page("https://ex.com/nested.xml", &urlset(&["https://ex.com/x"]));

        let crawler = crawler(fetcher, 1);
        let report = crawler.crawl().await;

        assert_eq!(
            report.visited,
            vec!["https://ex.com/first.xml", "https://ex.com/nested.xml"]
        );
    }

    #[tokio::test]
    async fn test_failed_document_records_empty_table() {
        let fetcher = StaticFetcher::new().with_page(
            "https://ex.com/robots.txt",
            "Sitemap: https://ex.com/gone.xml\n",
        );

        let report = crawler(fetcher, 20).crawl().await;

        let table = report.get("gone.xml").unwrap();
        assert_eq!(table.columns, vec!["URLs"]);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_missing_robots_produces_no_files() {
        let report = crawler(StaticFetcher::new(), 20).crawl().await;
        assert!(report.is_empty());
        assert!(report.visited.is_empty());

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("parsed_sitemaps");
        let written = report.export(&dir).await.unwrap();
        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_writes_one_file_per_sitemap() {
        let fetcher = StaticFetcher::new()
            .with_page("https://ex.com/robots.txt", "Sitemap: https://ex.com/sitemap.xml\n")
            .with_page(
                "https://ex.com/sitemap.xml",
                &urlset(&["https://ex.com/a/b", "https://ex.com/a"]),
            );
        let report = crawler(fetcher, 20).crawl().await;

        let tmp = tempfile::tempdir().unwrap();
        let written = report.export(tmp.path()).await.unwrap();

        assert_eq!(written, vec![tmp.path().join("sitemap.xml.csv")]);
        assert_eq!(
            std::fs::read_to_string(&written[0]).unwrap(),
            "URLs,Level_0,Level_1\nhttps://ex.com/a/b,a,b\nhttps://ex.com/a,a,\n"
        );
    }
}
