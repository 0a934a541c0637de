//! The pagination envelope for list endpoints.
//!
//! Every list response is `{count, next, previous, results}` where `next`
//! and `previous` are relative URLs for the neighbouring pages, rebuilt
//! from the request URI with only the `page` parameter swapped.

use axum::http::Uri;
use serde::Serialize;
use tea_core::pagination::{neighbours, total_pages};

#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(uri: &Uri, count: i64, page: i64, page_size: i64, results: Vec<T>) -> Self {
        let (previous, next) = neighbours(page, total_pages(count, page_size));
        Self {
            count,
            next: next.map(|p| page_url(uri, p)),
            previous: previous.map(|p| page_url(uri, p)),
            results,
        }
    }
}

/// The request URI with its `page` parameter replaced. All other query
/// parameters pass through untouched, so filters survive page flips.
fn page_url(uri: &Uri, page: i64) -> String {
    let mut params: Vec<String> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("page="))
        .map(String::from)
        .collect();
    params.push(format!("page={page}"));
    format!("{}?{}", uri.path(), params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_replaces_only_the_page_parameter() {
        let uri: Uri = "/api/v1/techniques?search=shap&page=3&page_size=10"
            .parse()
            .unwrap();
        assert_eq!(
            page_url(&uri, 4),
            "/api/v1/techniques?search=shap&page_size=10&page=4"
        );
    }

    #[test]
    fn page_url_without_existing_query() {
        let uri: Uri = "/api/v1/techniques".parse().unwrap();
        assert_eq!(page_url(&uri, 2), "/api/v1/techniques?page=2");
    }

    #[test]
    fn first_and_last_pages_have_one_neighbour() {
        let uri: Uri = "/api/v1/tags?page=1".parse().unwrap();
        let page = Page::new(&uri, 45, 1, 20, vec![1, 2, 3]);
        assert_eq!(page.previous, None);
        assert_eq!(page.next.as_deref(), Some("/api/v1/tags?page=2"));

        let last = Page::new(&uri, 45, 3, 20, vec![1]);
        assert_eq!(last.previous.as_deref(), Some("/api/v1/tags?page=2"));
        assert_eq!(last.next, None);
    }
}
