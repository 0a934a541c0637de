//! Normalisation of heterogeneous catalogue input.
//!
//! Corpus records accumulated several shapes for the same field over time:
//! limitations arrive as plain strings, `{"description": ...}` objects, or
//! strings that themselves contain serialized JSON; authors arrive as a
//! list or a single string; references to other entities arrive as numeric
//! ids or names. Everything here folds those shapes down to one canonical
//! form and never panics on malformed input.

use serde::Deserialize;
use serde_json::Value;

use crate::types::DbId;

/// A reference to a resource type, either by database id or by name.
///
/// Names are resolved with fetch-or-create semantics; ids must already
/// exist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceTypeRef {
    Id(DbId),
    Name(String),
}

/// A reference to an assurance goal, either by database id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GoalRef {
    Id(DbId),
    Name(String),
}

/// Extract the descriptive text from one limitation entry.
///
/// Accepts a plain string, an object with a `description` key, or an array
/// of such objects (first non-empty description wins). Strings that parse
/// as JSON are unwrapped one level first, so `"{\"description\": \"x\"}"`
/// yields `x`. Returns `None` when no usable text remains after trimming.
pub fn parse_limitation(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => parse_limitation_text(s),
        Value::Object(_) => description_of(value),
        Value::Array(items) => items.iter().find_map(description_of),
        _ => None,
    }
}

fn parse_limitation_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Some sources double-encode: the string itself is JSON.
    if let Ok(inner) = serde_json::from_str::<Value>(trimmed) {
        match &inner {
            Value::Object(_) => return description_of(&inner),
            Value::Array(items) => return items.iter().find_map(description_of),
            _ => {}
        }
    }
    Some(trimmed.to_string())
}

fn description_of(value: &Value) -> Option<String> {
    let text = value.get("description")?.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Flatten an authors field to a single display string.
///
/// Arrays are joined with `", "` after dropping blank entries; strings are
/// trimmed; null becomes the empty string. Anything else is rendered with
/// its JSON representation rather than rejected, since authors are display
/// data only.
pub fn parse_authors(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
