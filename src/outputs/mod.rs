//! Output generation.
//!
//! Every pipeline ends in one or more [`Table`](crate::models::Table)s, which
//! [`csv`] writes as one delimited file each:
//!
//! ```text
//! parsed_sitemaps/
//! ├── sitemap_index.xml.csv
//! ├── post-sitemap.xml.csv
//! └── page-sitemap.xml.csv
//!
//! output_data/
//! ├── Table_1.csv
//! └── Table_2.csv
//! ```

pub mod csv;
