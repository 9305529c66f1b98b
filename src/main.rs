//! # Tabular Scrapers
//!
//! Command-line front end for the sitemap, Spaceflight News and wiki table
//! pipelines. Each subcommand runs one pipeline and writes its CSV output.
//!
//! ## Usage
//!
//! ```sh
//! tabular_scrapers sitemap https://www.example.com -o ./parsed_sitemaps
//! tabular_scrapers news --total 1000
//! tabular_scrapers wiki https://en.wikipedia.org/wiki/Space_Shuttle -t Missions
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use clap::Parser;
use std::error::Error;
use tabular_scrapers::config::Settings;
use tabular_scrapers::models::SiteTarget;
use tabular_scrapers::scrapers::sitemap::SitemapCrawler;
use tabular_scrapers::scrapers::spaceflight::SpaceflightNewsScraper;
use tabular_scrapers::scrapers::wikitable::WikiTableParser;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tabular_scrapers starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref()).await?;
    args.apply(&mut settings);

    match &args.command {
        Command::Sitemap { site, .. } => {
            let site = SiteTarget::parse(site)?;
            let crawler = SitemapCrawler::new(site, settings.sitemap.clone(), &settings.http)?;
            let report = crawler.crawl().await;
            let written = report.export(&settings.sitemap.output_dir).await?;
            info!(
                dir = %settings.sitemap.output_dir.display(),
                files = written.len(),
                visited = report.visited.len(),
                "Sitemap export complete"
            );
        }
        Command::News { .. } => {
            let scraper = SpaceflightNewsScraper::new(settings.news.clone(), &settings.http)?;
            let table = scraper.scrape_to_csv().await?;
            info!(
                path = %settings.news.output_file.display(),
                rows = table.len(),
                columns = table.columns.len(),
                "News export complete"
            );
        }
        Command::Wiki { url, .. } => {
            let mut parser = WikiTableParser::new(url.as_str(), settings.wiki.titles.clone(), &settings.http)?;
            if let Err(e) = parser.parse_tables().await {
                error!(%url, error = %e, "Could not read wiki page");
                return Err(e);
            }
            let written = parser.export(&settings.wiki.output_dir).await?;
            info!(
                dir = %settings.wiki.output_dir.display(),
                files = written.len(),
                "Wiki table export complete"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
