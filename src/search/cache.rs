//! Query cache contract and cache-key canonicalization.
//!
//! The cache itself is an external collaborator (Redis, in-process, absent
//! entirely); the engine only derives keys and tolerates misses. Keys are a
//! SHA-256 digest of a canonical serialization of the specification plus
//! sort/pagination intent: semantically identical specifications that differ
//! only in parameter ordering hash identically.

use crate::search::spec::{FilterPredicate, FilterSpecification};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// TTL key-value cache for query results.
#[async_trait]
pub trait QueryCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<JsonValue>>;
    async fn set(&self, key: &str, rows: Vec<JsonValue>, ttl: Duration);
}

/// Derive the canonical cache key for a specification.
pub fn cache_key(spec: &FilterSpecification) -> String {
    let digest = Sha256::digest(canonical_form(spec).to_string().as_bytes());
    hex::encode(digest)
}

fn canonical_form(spec: &FilterSpecification) -> JsonValue {
    let mut filters: Vec<JsonValue> = spec
        .filters()
        .iter()
        .map(|f| {
            json!({
                "field": field_key(f.field),
                "predicate": predicate_form(&f.predicate),
            })
        })
        .collect();
    // Filter order is irrelevant to semantics (pure conjunction), so sort the
    // serialized entries for an order-independent key.
    filters.sort_by_key(|v| v.to_string());

    let mut exclusions: Vec<JsonValue> = spec
        .exclusions()
        .iter()
        .map(|e| {
            json!({
                "field": field_key(e.field),
                "values": sorted(&e.values),
            })
        })
        .collect();
    exclusions.sort_by_key(|v| v.to_string());

    let pagination = spec.pagination();
    json!({
        "filters": filters,
        "exclusions": exclusions,
        "free_text": spec.free_text(),
        "sort": spec.sort().map(|s| json!({"field": s.field, "asc": s.ascending})),
        "page_size": pagination.page_size,
        "offset": pagination.offset,
        "cursor": pagination.cursor,
    })
}

fn field_key(field: crate::schema::FilterField) -> String {
    format!("{}.{}", field.entity().table_name(), field.column())
}

fn predicate_form(predicate: &FilterPredicate) -> JsonValue {
    match predicate {
        FilterPredicate::Text { values, mode } => {
            json!({"text": sorted(values), "mode": format!("{mode:?}")})
        }
        FilterPredicate::Range { min, max } => json!({"min": min, "max": max}),
        FilterPredicate::Array { values, match_all } => {
            json!({"array": sorted(values), "all": match_all})
        }
        FilterPredicate::Domain { domains } => json!({"domains": sorted(domains)}),
    }
}

fn sorted(values: &[String]) -> Vec<String> {
    let mut out = values.to_vec();
    out.sort();
    out
}
