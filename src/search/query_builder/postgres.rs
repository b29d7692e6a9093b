//! Postgres rendering of abstract query plans.
//!
//! Translates a `QueryPlan` into a parameterized SQL statement plus bind
//! values. This is the driver side of the plan contract: the compiler never
//! builds statement strings itself, and other dialects can supply their own
//! translator against the same plan type.

use crate::schema::Entity;
use crate::search::query_builder::{Condition, OrderExpr, QueryPlan};

/// Bind values for the rendered statement.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    TextArray(Vec<String>),
    Int(i64),
}

fn push_text(binds: &mut Vec<BindValue>, value: String) -> usize {
    binds.push(BindValue::Text(value));
    binds.len()
}

fn push_text_array(binds: &mut Vec<BindValue>, values: Vec<String>) -> usize {
    binds.push(BindValue::TextArray(values));
    binds.len()
}

fn push_int(binds: &mut Vec<BindValue>, value: i64) -> usize {
    binds.push(BindValue::Int(value));
    binds.len()
}

/// Render the plan as `SELECT c.* ...` with LIMIT/OFFSET applied.
pub fn build_sql(plan: &QueryPlan) -> (String, Vec<BindValue>) {
    let mut binds = Vec::new();
    let mut sql = format!(
        "SELECT c.* FROM {} c WHERE c.deleted = false",
        plan.base.table_name()
    );

    push_predicates(plan, &mut sql, &mut binds);
    push_order_by(plan, &mut sql);

    sql.push_str(&format!(" LIMIT {}", plan.limit));
    if plan.offset > 0 {
        sql.push_str(&format!(" OFFSET {}", plan.offset));
    }

    (sql, binds)
}

/// Render the matching COUNT(*) statement (no ordering or window).
pub fn build_count_sql(plan: &QueryPlan) -> (String, Vec<BindValue>) {
    let mut binds = Vec::new();
    let mut sql = format!(
        "SELECT COUNT(*) FROM {} c WHERE c.deleted = false",
        plan.base.table_name()
    );
    push_predicates(plan, &mut sql, &mut binds);
    (sql, binds)
}

fn push_predicates(plan: &QueryPlan, sql: &mut String, binds: &mut Vec<BindValue>) {
    for condition in &plan.conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition_sql(condition, "c", binds));
    }

    for exists in &plan.exists {
        let alias = exists.entity.alias();
        let (local, primary) = exists
            .entity
            .correlation()
            .expect("EXISTS predicates target related entities only");
        let mut inner = format!(
            "EXISTS (SELECT 1 FROM {} {} WHERE {}.{} = {}",
            exists.entity.table_name(),
            alias,
            alias,
            local,
            primary
        );
        for condition in &exists.conditions {
            inner.push_str(" AND ");
            inner.push_str(&condition_sql(condition, alias, binds));
        }
        inner.push(')');
        sql.push_str(" AND ");
        sql.push_str(&inner);
    }
}

fn condition_sql(condition: &Condition, alias: &str, binds: &mut Vec<BindValue>) -> String {
    match condition {
        Condition::TextContainsAny { column, values } => {
            let idx = push_text_array(binds, contains_patterns(values));
            format!("{alias}.{column} ILIKE ANY(${idx})")
        }
        Condition::TextNotContainsAny { column, values } => {
            let idx = push_text_array(binds, contains_patterns(values));
            // NULL passes exclusion filters.
            format!("({alias}.{column} IS NULL OR NOT ({alias}.{column} ILIKE ANY(${idx})))")
        }
        Condition::TextEqualsNormalizedAny { column, values } => {
            let idx = push_text_array(binds, values.clone());
            format!(
                "{} = ANY(${idx})",
                sorted_words_expr(alias, column)
            )
        }
        Condition::TextContainsWordsAny { column, phrases } => {
            let mut alternatives = Vec::new();
            for words in phrases {
                let mut terms = Vec::new();
                for word in words {
                    let idx = push_text(binds, format!("%{}%", escape_like_pattern(word)));
                    terms.push(format!("{alias}.{column} ILIKE ${idx}"));
                }
                if !terms.is_empty() {
                    alternatives.push(format!("({})", terms.join(" AND ")));
                }
            }
            if alternatives.is_empty() {
                "TRUE".to_string()
            } else {
                format!("({})", alternatives.join(" OR "))
            }
        }
        Condition::DomainEqualsAny { column, domains } => {
            let idx = push_text_array(binds, domains.clone());
            format!("{} = ANY(${idx})", domain_expr(alias, column))
        }
        Condition::DomainNotIn { column, domains } => {
            let idx = push_text_array(binds, domains.clone());
            format!(
                "({alias}.{column} IS NULL OR NOT ({} = ANY(${idx})))",
                domain_expr(alias, column)
            )
        }
        Condition::NumberAtLeast { column, value } => {
            let idx = push_int(binds, *value);
            format!("{alias}.{column} >= ${idx}")
        }
        Condition::NumberAtMost { column, value } => {
            let idx = push_int(binds, *value);
            format!("{alias}.{column} <= ${idx}")
        }
        Condition::ArrayContainsAny { column, values } => {
            let idx = push_text_array(binds, values.clone());
            format!("{alias}.{column} && ${idx}::text[]")
        }
        Condition::ArrayContainsAll { column, values } => {
            let idx = push_text_array(binds, values.clone());
            format!("{alias}.{column} @> ${idx}::text[]")
        }
        Condition::ArrayExcludesAll { column, values } => {
            let idx = push_text_array(binds, values.clone());
            format!(
                "({alias}.{column} IS NULL OR NOT ({alias}.{column} && ${idx}::text[]))"
            )
        }
        Condition::FreeText { columns, term } => {
            let mut parts = Vec::new();
            for column in *columns {
                let idx = push_text(binds, format!("%{}%", escape_like_pattern(term)));
                parts.push(format!("{alias}.{column} ILIKE ${idx}"));
            }
            format!("({})", parts.join(" OR "))
        }
    }
}

fn push_order_by(plan: &QueryPlan, sql: &mut String) {
    let mut order_by = Vec::new();
    for term in &plan.order {
        let dir = if term.ascending { "ASC" } else { "DESC" };
        match &term.expr {
            OrderExpr::Column(column) => order_by.push(format!("c.{column} {dir}")),
            OrderExpr::RelatedScalar { entity, column } => {
                let alias = entity.alias();
                let (local, primary) = entity
                    .correlation()
                    .expect("related scalar order targets related entities only");
                order_by.push(format!(
                    "(SELECT {alias}.{column} FROM {} {alias} WHERE {alias}.{local} = {primary}) {dir} NULLS LAST",
                    entity.table_name()
                ));
            }
        }
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(&order_by.join(", "));
}

/// Word-sorted normal form of a column, matching `normalize::sort_words` on
/// the Rust side: lowercase, split on whitespace, sort tokens, rejoin.
/// Empty tokens from padded input are dropped and the sort is pinned to the
/// "C" collation so it agrees with the byte-wise Rust sort.
fn sorted_words_expr(alias: &str, column: &str) -> String {
    format!(
        "array_to_string(ARRAY(SELECT w FROM unnest(regexp_split_to_array(lower({alias}.{column}), '\\s+')) AS t(w) WHERE w <> '' ORDER BY w COLLATE \"C\"), ' ')"
    )
}

/// Registrable domain of a URL column, matching `normalize::registrable_domain`.
fn domain_expr(alias: &str, column: &str) -> String {
    format!(
        "split_part(split_part(regexp_replace(regexp_replace(lower({alias}.{column}), '^[a-z][a-z0-9+.-]*://', ''), '^www\\.', ''), '/', 1), ':', 1)"
    )
}

fn contains_patterns(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| format!("%{}%", escape_like_pattern(v)))
        .collect()
}

fn escape_like_pattern(s: &str) -> String {
    // Escape SQL LIKE meta-characters so user input is treated literally.
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
