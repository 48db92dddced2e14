//! Customer reviews from a published spreadsheet CSV export, plus the small
//! pieces of logic behind the cleaning-service site (contact links, quote form).
//!
//! - Pipeline: fetch → [`parse_csv`] → [`HeaderMap::resolve`] → [`map_row`] → [`average_rating`].
//! - [`ReviewsAccessor`] re-runs the pipeline when its source URL changes and
//!   never lets a superseded fetch overwrite a newer result.
//! - Saved exports (plain, gzip or zstd, any charset) load through [`reader_from_path`].
//!
//! Data shape:
//! - [`ReviewFeed`] `{ reviews, average, row_count, dropped, checksum }`
//! - [`ReviewsState`] `{ source, reviews, average, loading, error }` for the UI

mod codec;
mod io;

pub mod accessor;
pub mod aggregate;
pub mod config;
pub mod contact;
pub mod fetch;
pub mod headers;
pub mod parse;
pub mod quote;
pub mod review;

pub use crate::accessor::{ReviewsAccessor, ReviewsState};
pub use crate::aggregate::average_rating;
pub use crate::config::SiteConfig;
pub use crate::fetch::{CsvFetcher, HttpFetcher};
pub use crate::headers::{Field, HeaderMap};
pub use crate::io::{build_csv_reader, reader_from_path, reviews_from_reader, CsvMeta};
pub use crate::parse::{parse_csv, Grid};
pub use crate::review::{coerce_rating, map_row, Review};

use thiserror::Error;
use tracing::debug;

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFeed {
    pub reviews: Vec<Review>,
    pub average: f64,
    /// Data rows after the header.
    pub row_count: usize,
    /// Rows with neither a name nor feedback text.
    pub dropped: usize,
    /// CRC32 of the raw payload.
    pub checksum: u32,
}

/// Error type returned by this crate.
#[derive(Debug, Error)]
pub enum ReviewsError {
    #[error("CSV fetch failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("CSV fetch failed: {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },
    #[error("quote submission failed: {0}")]
    Submission(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] figment::Error),
}

pub type ReviewsResult<T> = std::result::Result<T, ReviewsError>;

/// Parse, map and aggregate an already-fetched CSV payload. Never fails:
/// bad rows are dropped and an empty payload gives an empty feed.
pub fn reviews_from_text(csv: &str) -> ReviewFeed {
    let checksum = crc32fast::hash(csv.as_bytes());
    let rows = parse_csv(csv);

    let Some((header, data)) = rows.split_first() else {
        return ReviewFeed {
            checksum,
            ..Default::default()
        };
    };

    let headers = HeaderMap::resolve(header);
    let missing = headers.missing();
    if !missing.is_empty() {
        debug!(?missing, "no matching column for some review fields");
    }

    let reviews: Vec<Review> = data
        .iter()
        .filter_map(|row| map_row(row, &headers))
        .collect();
    let dropped = data.len() - reviews.len();
    debug!(rows = data.len(), accepted = reviews.len(), dropped, "mapped review rows");

    ReviewFeed {
        average: average_rating(&reviews),
        reviews,
        row_count: data.len(),
        dropped,
        checksum,
    }
}

/// Fetch `url` with `fetcher` and run the whole pipeline once.
pub async fn fetch_reviews_from_csv<F>(fetcher: &F, url: &str) -> ReviewsResult<ReviewFeed>
where
    F: CsvFetcher + ?Sized,
{
    let text = fetcher.fetch_text(url).await?;
    Ok(reviews_from_text(&text))
}
