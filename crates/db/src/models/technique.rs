//! Technique models, filters, and ordering.
//!
//! The technique's primary key is its slug. Rows carry only scalar columns;
//! classification links and owned children are joined on read into
//! [`TechniqueDetail`].

use serde::Serialize;
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

use crate::models::goal::AssuranceGoal;
use crate::models::limitation::Limitation;
use crate::models::resource::ResourceWithType;
use crate::models::tag::Tag;
use crate::models::use_case::UseCaseWithGoal;

/// A row from the `techniques` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Technique {
    pub slug: String,
    pub name: String,
    pub acronym: Option<String>,
    pub description: String,
    pub complexity_rating: Option<i32>,
    pub computational_cost_rating: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A technique enriched with its classifications and owned children, as
/// returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TechniqueDetail {
    #[serde(flatten)]
    pub technique: Technique,
    pub assurance_goals: Vec<AssuranceGoal>,
    pub tags: Vec<Tag>,
    pub related_techniques: Vec<String>,
    pub resources: Vec<ResourceWithType>,
    pub example_use_cases: Vec<UseCaseWithGoal>,
    pub limitations: Vec<Limitation>,
}

/// Scalar column values for an insert or a full-field update. The write
/// pipeline computes these before touching the database.
#[derive(Debug, Clone)]
pub struct TechniqueFields {
    pub name: String,
    pub acronym: Option<String>,
    pub description: String,
    pub complexity_rating: Option<i32>,
    pub computational_cost_rating: Option<i32>,
}

/// Filters for technique listing. All filters compose with AND; multiple
/// ids within one filter compose with OR (`= ANY`).
#[derive(Debug, Clone, Default)]
pub struct TechniqueFilters {
    /// Case-insensitive substring match over name, acronym, and description.
    pub search: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub acronym: Option<String>,
    pub goal_ids: Vec<DbId>,
    pub tag_ids: Vec<DbId>,
    pub complexity_rating: Option<i32>,
    pub computational_cost_rating: Option<i32>,
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Columns a client may order technique listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Slug,
    Name,
    CreatedAt,
    UpdatedAt,
    ComplexityRating,
    ComputationalCostRating,
}

impl OrderField {
    fn column(self) -> &'static str {
        match self {
            OrderField::Slug => "slug",
            OrderField::Name => "name",
            OrderField::CreatedAt => "created_at",
            OrderField::UpdatedAt => "updated_at",
            OrderField::ComplexityRating => "complexity_rating",
            OrderField::ComputationalCostRating => "computational_cost_rating",
        }
    }
}

/// A parsed `ordering` query value: a whitelisted field with an optional
/// leading `-` for descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechniqueOrdering {
    pub field: OrderField,
    pub descending: bool,
}

impl Default for TechniqueOrdering {
    fn default() -> Self {
        Self {
            field: OrderField::Name,
            descending: false,
        }
    }
}

impl TechniqueOrdering {
    /// Parse an ordering value such as `name` or `-created_at`. Returns
    /// `None` for fields outside the whitelist, which callers reject as a
    /// validation error rather than passing anything through to SQL.
    pub fn parse(raw: &str) -> Option<Self> {
        let (descending, field_name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match field_name {
            "slug" => OrderField::Slug,
            "name" => OrderField::Name,
            "created_at" => OrderField::CreatedAt,
            "updated_at" => OrderField::UpdatedAt,
            "complexity_rating" => OrderField::ComplexityRating,
            "computational_cost_rating" => OrderField::ComputationalCostRating,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    /// The ORDER BY expression, slug-tie-broken so pagination is stable.
    pub fn sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        if self.field == OrderField::Slug {
            return format!("slug {direction}");
        }
        format!("{} {direction}, slug ASC", self.field.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_parses_whitelisted_fields() {
        let ordering = TechniqueOrdering::parse("name").unwrap();
        assert_eq!(ordering.field, OrderField::Name);
        assert!(!ordering.descending);

        let ordering = TechniqueOrdering::parse("-created_at").unwrap();
        assert_eq!(ordering.field, OrderField::CreatedAt);
        assert!(ordering.descending);
    }

    #[test]
    fn ordering_rejects_unknown_fields() {
        assert_eq!(TechniqueOrdering::parse("slug; DROP TABLE techniques"), None);
        assert_eq!(TechniqueOrdering::parse(""), None);
        assert_eq!(TechniqueOrdering::parse("-"), None);
        assert_eq!(TechniqueOrdering::parse("Name"), None);
    }

    #[test]
    fn ordering_sql_is_stable() {
        assert_eq!(TechniqueOrdering::default().sql(), "name ASC, slug ASC");
        assert_eq!(
            TechniqueOrdering::parse("-complexity_rating").unwrap().sql(),
            "complexity_rating DESC, slug ASC"
        );
        // Ordering by slug needs no tie-break.
        assert_eq!(TechniqueOrdering::parse("-slug").unwrap().sql(), "slug DESC");
    }
}
