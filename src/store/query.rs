//! Query directives for listing documents.

use super::StoredDocument;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Pseudo-field naming the document id.
pub const ID_FIELD: &str = "$id";

/// Pseudo-field naming the store-assigned creation time.
pub const CREATED_AT_FIELD: &str = "$createdAt";

/// One filter, sort or paging directive.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    /// Field equals value.
    Equal(String, Value),
    /// Sort ascending by field.
    OrderAsc(String),
    /// Sort descending by field.
    OrderDesc(String),
    /// Return at most this many documents.
    Limit(usize),
    /// Skip this many documents before applying the limit.
    Offset(usize),
}

impl Query {
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal(field.into(), value.into())
    }

    pub fn order_asc(field: impl Into<String>) -> Self {
        Query::OrderAsc(field.into())
    }

    pub fn order_desc(field: impl Into<String>) -> Self {
        Query::OrderDesc(field.into())
    }

    pub fn limit(n: usize) -> Self {
        Query::Limit(n)
    }

    pub fn offset(n: usize) -> Self {
        Query::Offset(n)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Equal(field, value) => write!(f, "{} = {}", field, value),
            Query::OrderAsc(field) => write!(f, "order {} asc", field),
            Query::OrderDesc(field) => write!(f, "order {} desc", field),
            Query::Limit(n) => write!(f, "limit {}", n),
            Query::Offset(n) => write!(f, "offset {}", n),
        }
    }
}

/// Field value of a document, including the `$id` / `$createdAt` pseudo-fields.
pub fn field_value(document: &StoredDocument, field: &str) -> Option<Value> {
    match field {
        ID_FIELD => Some(Value::String(document.id.clone())),
        CREATED_AT_FIELD => Some(Value::String(document.created_at.to_rfc3339())),
        _ => document.data.get(field).cloned(),
    }
}

/// Whether a document satisfies every `Equal` directive.
pub fn matches(document: &StoredDocument, queries: &[Query]) -> bool {
    queries.iter().all(|query| match query {
        Query::Equal(field, expected) => field_value(document, field).as_ref() == Some(expected),
        _ => true,
    })
}

/// Compare two documents by the sort directives, first directive first.
pub fn compare(a: &StoredDocument, b: &StoredDocument, queries: &[Query]) -> Ordering {
    for query in queries {
        let ordering = match query {
            Query::OrderAsc(field) => compare_values(&field_value(a, field), &field_value(b, field)),
            Query::OrderDesc(field) => {
                compare_values(&field_value(a, field), &field_value(b, field)).reverse()
            }
            _ => continue,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Apply filters, sorts, offset and limit to a document set.
///
/// Without a sort directive documents come back in creation order.
pub fn apply(mut documents: Vec<StoredDocument>, queries: &[Query]) -> Vec<StoredDocument> {
    documents.retain(|doc| matches(doc, queries));
    documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    documents.sort_by(|a, b| compare(a, b, queries));

    let offset = queries
        .iter()
        .filter_map(|q| match q {
            Query::Offset(n) => Some(*n),
            _ => None,
        })
        .last()
        .unwrap_or(0);
    let limit = queries
        .iter()
        .filter_map(|q| match q {
            Query::Limit(n) => Some(*n),
            _ => None,
        })
        .last();

    let rest = documents.into_iter().skip(offset);
    match limit {
        Some(n) => rest.take(n).collect(),
        None => rest.collect(),
    }
}

// Missing and null sort first, then booleans, numbers, strings.
fn rank(value: &Option<Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: &Option<Value>, b: &Option<Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            // Timestamps compare chronologically; fractional seconds break plain text order.
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(tx), Some(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map};

    fn doc(id: &str, secs: i64, data: Value) -> StoredDocument {
        let created = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        let data: Map<String, Value> = data.as_object().cloned().unwrap_or_default();
        StoredDocument {
            id: id.to_string(),
            collection: "bills".to_string(),
            created_at: created,
            updated_at: created,
            data,
        }
    }

    #[test]
    fn test_equal_filter() {
        let docs = vec![
            doc("a", 0, json!({ "status": "paid" })),
            doc("b", 1, json!({ "status": "pending" })),
        ];
        let out = apply(docs, &[Query::equal("status", "pending")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "b");
    }

    #[test]
    fn test_order_desc_on_timestamps_with_fractions() {
        let docs = vec![
            doc("whole", 0, json!({ "date": "2025-01-01T10:00:00Z" })),
            doc("fraction", 1, json!({ "date": "2025-01-01T10:00:00.500Z" })),
            doc("earlier", 2, json!({ "date": "2024-12-31T23:59:59Z" })),
        ];
        let ids: Vec<String> = apply(docs, &[Query::order_desc("date")])
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["fraction", "whole", "earlier"]);
    }

    #[test]
    fn test_default_order_is_creation() {
        let docs = vec![doc("late", 5, json!({})), doc("early", 1, json!({}))];
        let ids: Vec<String> = apply(docs, &[]).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_offset_and_limit() {
        let docs = (0..5)
            .map(|i| doc(&format!("d{}", i), i, json!({ "n": i })))
            .collect();
        let ids: Vec<String> = apply(
            docs,
            &[Query::order_asc("n"), Query::offset(1), Query::limit(2)],
        )
        .into_iter()
        .map(|d| d.id)
        .collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[test]
    fn test_pseudo_fields() {
        let d = doc("abc", 0, json!({}));
        assert_eq!(field_value(&d, ID_FIELD), Some(json!("abc")));
        assert!(field_value(&d, CREATED_AT_FIELD).is_some());
        assert!(matches(&d, &[Query::equal(ID_FIELD, "abc")]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Query::order_desc("date").to_string(), "order date desc");
        assert_eq!(Query::equal("status", "paid").to_string(), "status = \"paid\"");
    }
}
