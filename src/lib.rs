//! # Tabular Scrapers
//!
//! Fetches structured data from three kinds of web sources and flattens each
//! into CSV files:
//!
//! - **Sitemaps**: sitemap entry points declared in `robots.txt` are walked
//!   depth-first (including nested sitemap indexes), and every visited
//!   document becomes one table of URLs decomposed into `Level_N` path columns.
//! - **Spaceflight News**: a paginated JSON API is read page by page and its
//!   `results` records are flattened into a single table.
//! - **Wiki tables**: every `table.wikitable` on a page becomes its own table.
//!
//! ## Architecture
//!
//! Every pipeline is a sequential fetch, parse, flatten and save pass:
//! 1. **Fetching**: one HTTP GET per resource through a [`fetch::FetchAsync`]
//!    implementation (swappable for tests)
//! 2. **Parsing**: quick-xml for sitemaps, scraper for HTML, serde_json for the API
//! 3. **Flattening**: everything ends up as a [`models::Table`]
//! 4. **Output**: [`outputs::csv`] writes one file per table
//!
//! ```no_run
//! use tabular_scrapers::config::{CrawlerConfig, HttpConfig};
//! use tabular_scrapers::models::SiteTarget;
//! use tabular_scrapers::scrapers::sitemap::SitemapCrawler;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let site = SiteTarget::parse("https://www.example.com")?;
//! let crawler = SitemapCrawler::new(site, CrawlerConfig::default(), &HttpConfig::default())?;
//! let report = crawler.crawl().await;
//! report.export("parsed_sitemaps").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decompose;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;
