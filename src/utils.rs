//! Small string helpers for URLs and log output.

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backing off to a char boundary) with
/// an ellipsis and a count of the dropped bytes appended.
///
/// # Examples
///
/// ```
/// use tabular_scrapers::utils::truncate_for_log;
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Final `/`-delimited segment of a URL.
///
/// A URL ending in `/` yields the empty string.
///
/// ```
/// use tabular_scrapers::utils::terminal_segment;
/// assert_eq!(terminal_segment("https://ex.com/maps/sitemap.xml"), "sitemap.xml");
/// ```
pub fn terminal_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Whether a `<loc>` entry points at another sitemap rather than a page.
pub fn is_nested_sitemap(loc: &str) -> bool {
    loc.ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // "é" is two bytes; cutting at 1 must not split it
        let result = truncate_for_log("éé", 1);
        assert_eq!(result, "…(+4 bytes)");
    }

    #[test]
    fn test_terminal_segment() {
        assert_eq!(terminal_segment("https://ex.com/a/b/sitemap.xml"), "sitemap.xml");
        assert_eq!(terminal_segment("https://ex.com/"), "");
        assert_eq!(terminal_segment("sitemap.xml"), "sitemap.xml");
    }

    #[test]
    fn test_is_nested_sitemap() {
        assert!(is_nested_sitemap("https://ex.com/sitemap-1.xml"));
        assert!(!is_nested_sitemap("https://ex.com/about"));
        assert!(!is_nested_sitemap("https://ex.com/sitemap.xml.gz"));
        assert!(!is_nested_sitemap("https://ex.com/SITEMAP.XML"));
    }
}
