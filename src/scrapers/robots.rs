//! Sitemap discovery from `robots.txt`.
//!
//! Only lines starting with the exact, case-sensitive prefix `Sitemap:` count.
//! The URL is the text after the first `": "` separator, trimmed. No other
//! robots directives are interpreted.

use tracing::debug;

const SITEMAP_PREFIX: &str = "Sitemap:";

/// Sitemap URLs declared in `robots_txt`, in file order.
///
/// Declarations without a `": "` separator (e.g. `Sitemap:https://...`) are
/// skipped. URLs are not validated.
pub fn declared_sitemaps(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .filter(|line| line.starts_with(SITEMAP_PREFIX))
        .filter_map(|line| match line.split(": ").nth(1) {
            Some(url) => Some(url.trim().to_string()),
            None => {
                debug!(line, "Sitemap declaration without ': ' separator; ignoring");
                None
            }
        })
        .collect()
}
