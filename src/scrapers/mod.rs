//! Source-specific pipelines.
//!
//! Each pipeline fetches its source sequentially, flattens what it finds into
//! [`Table`](crate::models::Table)s and can export them as CSV.
//!
//! # Supported Sources
//!
//! | Source | Module | Input | Output |
//! |--------|--------|-------|--------|
//! | robots.txt | [`robots`] | plain text | declared sitemap URLs |
//! | Sitemaps | [`sitemap`] | XML, nested indexes followed | one CSV per sitemap |
//! | Spaceflight News | [`spaceflight`] | paginated JSON API | one CSV |
//! | Wiki pages | [`wikitable`] | HTML `table.wikitable` | one CSV per table |
//!
//! # Failure Handling
//!
//! The sitemap and news pipelines are best-effort: a failed fetch is logged
//! and contributes nothing. The wiki parser has a single page to work from and
//! returns the fetch error instead.

pub mod robots;
pub mod sitemap;
pub mod spaceflight;
pub mod wikitable;
