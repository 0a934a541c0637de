//! Field-level validation shared by the API and the bulk importer.
//!
//! Checks accumulate messages into a [`FieldErrors`] map instead of failing
//! fast, so a caller can report everything wrong with a record at once.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FieldErrors;

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_RATING_RANGE: &str = "Rating must be between 1 and 5.";
pub const MSG_INVALID_URL: &str = "Enter a valid URL.";

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://[A-Za-z0-9][A-Za-z0-9._-]*(:\d+)?([/?#]\S*)?$")
            .expect("url pattern is valid")
    })
}

/// Record an error if `value` is empty after trimming.
pub fn check_required(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, MSG_REQUIRED);
    }
}

/// Record an error if a rating is present and outside [1, 5].
///
/// `None` passes; ratings are optional everywhere they appear.
pub fn check_rating(errors: &mut FieldErrors, field: &str, value: Option<i64>) {
    if let Some(rating) = value {
        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            errors.push(field, MSG_RATING_RANGE);
        }
    }
}

/// Record an error unless `value` is an http(s) URL with a plausible host.
pub fn check_url(errors: &mut FieldErrors, field: &str, value: &str) {
    if !url_pattern().is_match(value.trim()) {
        errors.push(field, MSG_INVALID_URL);
    }
}
