//! Command-line interface definitions.
//!
//! Every option can also come from the settings file passed with `--config`;
//! flags given on the command line win.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabular_scrapers::config::Settings;

/// Command-line arguments for the scrapers.
///
/// # Examples
///
/// ```sh
/// # Crawl a site's sitemaps into ./parsed_sitemaps
/// tabular_scrapers sitemap https://www.example.com
///
/// # Fetch 1000 news articles, 100 per request
/// tabular_scrapers news --per-page 100 --total 1000 -o news.csv
///
/// # Extract the tables of a wiki page with titles
/// tabular_scrapers wiki https://en.wikipedia.org/wiki/List_of_Falcon_9_launches -t Launches
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, env = "TABULAR_SCRAPERS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// User-Agent header sent with every request
    #[arg(long, env = "TABULAR_SCRAPERS_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl the sitemaps declared in a site's robots.txt
    Sitemap {
        /// Root URL of the site, e.g. https://www.example.com
        site: String,

        /// Maximum number of nested sitemaps to open
        #[arg(short = 'n', long)]
        max_sitemaps: Option<usize>,

        /// Directory receiving one CSV per sitemap
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Download articles from the Spaceflight News API
    News {
        /// Articles endpoint
        #[arg(long)]
        base_url: Option<String>,

        /// Articles per request
        #[arg(long)]
        per_page: Option<usize>,

        /// Stop generating offsets at this value
        #[arg(long)]
        total: Option<usize>,

        /// CSV file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the wikitable tables of a page
    Wiki {
        /// Page URL
        url: String,

        /// Title for each table, in page order (repeatable)
        #[arg(short, long = "title")]
        titles: Vec<String>,

        /// Directory receiving one CSV per table
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Overlay the flags that were given onto `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(ua) = &self.user_agent {
            settings.http.user_agent = ua.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.http.timeout_secs = Some(secs);
        }

        match &self.command {
            Command::Sitemap {
                max_sitemaps,
                output_dir,
                ..
            } => {
                if let Some(n) = max_sitemaps {
                    settings.sitemap.max_sitemap_limit = *n;
                }
                if let Some(dir) = output_dir {
                    settings.sitemap.output_dir = dir.clone();
                }
            }
            Command::News {
                base_url,
                per_page,
                total,
                output,
            } => {
                if let Some(url) = base_url {
                    settings.news.base_url = url.clone();
                }
                if let Some(n) = per_page {
                    settings.news.per_page_limit = *n;
                }
                if let Some(n) = total {
                    settings.news.total_limit = *n;
                }
                if let Some(path) = output {
                    settings.news.output_file = path.clone();
                }
            }
            Command::Wiki {
                titles, output_dir, ..
            } => {
                if !titles.is_empty() {
                    settings.wiki.titles = titles.clone();
                }
                if let Some(dir) = output_dir {
                    settings.wiki.output_dir = dir.clone();
                }
            }
        }
    }
}
