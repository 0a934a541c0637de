//! Shared query parameter types for API handlers.

use serde::Deserialize;
use tea_core::types::DbId;

use crate::error::AppError;

/// Generic list parameters (`?page=&page_size=&search=`).
///
/// Used by the catalogue list endpoints. `page` is 1-based; `page_size`
/// is clamped against the configured maximum in the handler.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

/// Query parameters for the technique list endpoint.
///
/// `assurance_goals` and `tags` take comma-separated id lists; `ordering`
/// takes a whitelisted column name with an optional `-` prefix for
/// descending (unknown names are rejected with a 400).
#[derive(Debug, Deserialize)]
pub struct TechniqueListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub acronym: Option<String>,
    pub complexity_rating: Option<i32>,
    pub computational_cost_rating: Option<i32>,
    pub assurance_goals: Option<String>,
    pub tags: Option<String>,
    pub ordering: Option<String>,
}

/// Parse a comma-separated id list, rejecting non-numeric entries.
pub fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Vec<DbId>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: DbId = part.parse().map_err(|_| {
            AppError::BadRequest(format!("{field} must be a comma-separated list of ids"))
        })?;
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_parse_and_reject() {
        assert_eq!(parse_id_list("tags", None).unwrap(), Vec::<DbId>::new());
        assert_eq!(parse_id_list("tags", Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("tags", Some("")).unwrap(), Vec::<DbId>::new());
        assert!(parse_id_list("tags", Some("1,x")).is_err());
    }
}
