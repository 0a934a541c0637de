//! Page-number pagination arithmetic.
//!
//! List endpoints respond with `{count, next, previous, results}`; the
//! maths for page clamping, offsets, and neighbour pages lives here, away
//! from the HTTP layer.

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolve a requested page size against a configured maximum.
///
/// Absent means the default; anything else is clamped into `[1, max]`.
pub fn clamp_page_size(requested: Option<i64>, max: i64) -> i64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, max)
}

/// Row offset for a 1-based page number.
pub fn offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1) * page_size
}

/// Number of pages needed for `count` rows. An empty result set still has
/// one (empty) page, so page 1 is always addressable.
pub fn total_pages(count: i64, page_size: i64) -> i64 {
    if count <= 0 {
        return 1;
    }
    (count + page_size - 1) / page_size
}

/// Previous and next page numbers around `page`, `None` at either edge.
/// `previous` is clamped into range so a request past the last page still
/// links back to real rows.
pub fn neighbours(page: i64, total_pages: i64) -> (Option<i64>, Option<i64>) {
    let previous = (page > 1).then(|| (page - 1).min(total_pages));
    let next = (page < total_pages).then_some(page + 1);
    (previous, next)
}
