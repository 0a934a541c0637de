//! Publication date parsing.
//!
//! Corpus data carries dates in every format its upstream sources used, so
//! parsing is a cascade of formats tried in order, ending with a bare-year
//! rescue. Callers log a warning when everything fails.

use chrono::NaiveDate;

/// Formats tried verbatim, in priority order. US month-first is tried
/// before UK day-first, so an ambiguous `03/04/2023` reads as March 4th.
const FORMATS: &[&str] = &[
    "%Y-%m-%d",  // ISO: 2023-01-15
    "%m/%d/%Y",  // US: 01/15/2023
    "%d/%m/%Y",  // UK: 15/01/2023
    "%d %B %Y",  // 15 January 2023
    "%B %d, %Y", // January 15, 2023
];

/// Parse a raw publication date string into a date.
///
/// The cascade: exact formats above, then bare year (`"2023"` → Jan 1),
/// then month-and-year (`"January 2023"` → first of month), and as a last
/// resort the first plausible four-digit year found anywhere in the string
/// (`"circa 2019, preprint"` → Jan 1 2019). Returns `None` when nothing
/// matches.
pub fn parse_publication_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Bare year.
    if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(date) = year_to_date(trimmed.parse().ok()?) {
            return Some(date);
        }
    }

    // "January 2023" and friends: prepend a day and reuse the long format.
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {trimmed}"), "%d %B %Y") {
        return Some(date);
    }

    extract_year(trimmed)
}

/// Scan for a standalone four-digit year in [1000, 2999] and map it to
/// January 1st of that year.
fn extract_year(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        let window = &bytes[i..i + 4];
        if !window.iter().all(u8::is_ascii_digit) {
            continue;
        }
        // Reject windows embedded in longer digit runs (e.g. "20230115").
        let standalone = (i == 0 || !bytes[i - 1].is_ascii_digit())
            && (i + 4 == bytes.len() || !bytes[i + 4].is_ascii_digit());
        if !standalone {
            continue;
        }
        let year: i32 = s[i..i + 4].parse().ok()?;
        if (1000..3000).contains(&year) {
            return year_to_date(year);
        }
    }
    None
}

fn year_to_date(year: i32) -> Option<NaiveDate> {
    if (1000..3000).contains(&year) {
        NaiveDate::from_ymd_opt(year, 1, 1)
    } else {
        None
    }
}
