use crate::headers::HeaderMap;

/// Name shown when a review has feedback text but nobody signed it.
pub const ANONYMOUS: &str = "Anonymous";

/// Rating used when the source value is missing or not a number.
pub const DEFAULT_RATING: u8 = 5;

/// One customer review, as shown on the testimonials panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub name: String,
    pub text: String,
    /// Always in `1..=5`.
    pub rating: u8,
    pub city: Option<String>,
    pub service: Option<String>,
}

/// Coerce a rating cell to an integer star count in `1..=5`.
///
/// A missing cell (unresolved column or short row) gives [`DEFAULT_RATING`].
/// A present cell is read leniently: blank is `0`, `0x`/`0o`/`0b` prefixes
/// are unsigned integers in that radix, anything else non-numeric (including
/// `inf`/`NaN`) falls back to [`DEFAULT_RATING`]. Numbers are rounded and
/// clamped, so a blank cell ends up as one star.
pub fn coerce_rating(raw: Option<&str>) -> u8 {
    match raw.and_then(cell_number).filter(|x| x.is_finite()) {
        Some(x) => x.round().clamp(1.0, 5.0) as u8,
        None => DEFAULT_RATING,
    }
}

fn cell_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    let radix = match s.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return s.parse::<f64>().ok(),
    };
    u64::from_str_radix(&s[2..], radix).ok().map(|n| n as f64)
}

fn cell<'a>(row: &'a [String], idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| row.get(i)).map(String::as_str)
}

/// Map one data row to a review.
///
/// Returns `None` when both the name and the feedback text are blank. Cells
/// past the end of a short row read as absent.
pub fn map_row(row: &[String], headers: &HeaderMap) -> Option<Review> {
    let name = cell(row, headers.name).unwrap_or_default().trim();
    let text = cell(row, headers.text).unwrap_or_default().trim();

    if name.is_empty() && text.is_empty() {
        return None;
    }

    Some(Review {
        name: if name.is_empty() { ANONYMOUS } else { name }.to_string(),
        text: text.to_string(),
        rating: coerce_rating(cell(row, headers.rating)),
        city: cell(row, headers.city).map(|s| s.trim().to_string()),
        service: cell(row, headers.service).map(|s| s.trim().to_string()),
    })
}
