//! Query compilation from filter specifications.
//!
//! Builds an abstract `QueryPlan` from a validated `FilterSpecification` and
//! its `PredicatePlan`:
//! - Base scan of `contacts` only - never joins
//! - One EXISTS-style predicate per related entity that has active conditions
//! - Ordering by a direct column or a related-entity scalar subquery
//! - Resolved limit/offset pagination
//!
//! The plan is pure data; a driver-specific translator (see `postgres`)
//! renders it to an actual statement. For a fixed specification the compiler
//! produces identical plans on every invocation.

pub mod postgres;

use crate::config::SearchConfig;
use crate::schema::{sort_field, Entity, FilterField, FREE_TEXT_COLUMNS};
use crate::search::cursor;
use crate::search::normalize::{registrable_domain, word_tokens, NormalizerCache};
use crate::search::planner::{OrderSource, PredicatePlan};
use crate::search::spec::{FilterPredicate, FilterSpecification, TextMatchMode};
use crate::{Error, Result};

/// A single compiled boolean condition against one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive containment of any value.
    TextContainsAny { column: &'static str, values: Vec<String> },
    /// Negated containment. A NULL column passes: exclusions only remove rows
    /// that demonstrably match (documented policy, not NULL propagation).
    TextNotContainsAny { column: &'static str, values: Vec<String> },
    /// Word-order-insensitive equality against any of the pre-normalized
    /// values. Requires exact word-set equality, not substring.
    TextEqualsNormalizedAny { column: &'static str, values: Vec<String> },
    /// "Jumble" match: for some phrase, every one of its words appears
    /// somewhere in the column value.
    TextContainsWordsAny { column: &'static str, phrases: Vec<Vec<String>> },
    /// The column URL's registrable domain equals any of the given domains.
    DomainEqualsAny { column: &'static str, domains: Vec<String> },
    /// Negated domain equality; NULL passes.
    DomainNotIn { column: &'static str, domains: Vec<String> },
    NumberAtLeast { column: &'static str, value: i64 },
    NumberAtMost { column: &'static str, value: i64 },
    /// Any requested value is an element of the array column.
    ArrayContainsAny { column: &'static str, values: Vec<String> },
    /// Every requested value is an element of the array column.
    ArrayContainsAll { column: &'static str, values: Vec<String> },
    /// No requested value is an element; a NULL array passes vacuously.
    ArrayExcludesAll { column: &'static str, values: Vec<String> },
    /// Free-text term matched as substring against several primary columns.
    FreeText { columns: &'static [&'static str], term: String },
}

/// EXISTS-style predicate over one related entity: a correlated row exists
/// and satisfies the conjunction of the entity's active conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsPredicate {
    pub entity: Entity,
    pub conditions: Vec<Condition>,
}

/// Source of an ORDER BY expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderExpr {
    /// Direct column on the primary table.
    Column(&'static str),
    /// Scalar subquery selecting the correlated related-entity column,
    /// keeping the base scan join-free even when ordering by related data.
    RelatedScalar { entity: Entity, column: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub expr: OrderExpr,
    pub ascending: bool,
}

/// The compiled, executable query plan. Pure data, deterministic for a fixed
/// specification, handed to a driver translator for statement construction.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Base scan target; always the primary entity.
    pub base: Entity,
    /// Conditions applied directly to the base scan.
    pub conditions: Vec<Condition>,
    /// One entry per related entity with active conditions.
    pub exists: Vec<ExistsPredicate>,
    /// Ordering terms, always ending in a primary-key tie-break.
    pub order: Vec<OrderTerm>,
    pub limit: usize,
    pub offset: u64,
}

impl QueryPlan {
    /// The same plan over a different result window. Used by the batcher for
    /// bounded sub-scans; ordering and predicates are untouched so sub-scan
    /// concatenation preserves the single-scan row sequence.
    pub fn with_window(&self, offset: u64, limit: usize) -> Self {
        Self {
            offset,
            limit,
            ..self.clone()
        }
    }
}

/// Compile a specification into a query plan.
///
/// Fails on an unrecognized sort key, an undecodable cursor, or a page size
/// above the configured cap; total for every other well-typed specification.
pub fn compile(
    spec: &FilterSpecification,
    plan: &PredicatePlan,
    config: &SearchConfig,
    normalizer: &NormalizerCache,
) -> Result<QueryPlan> {
    let mut primary = Vec::new();
    let mut metadata = Vec::new();
    let mut company = Vec::new();
    let mut company_metadata = Vec::new();

    {
        let mut push = |field: FilterField, condition: Condition| match field.entity() {
            Entity::Contact => primary.push(condition),
            Entity::ContactMetadata => metadata.push(condition),
            Entity::Company => company.push(condition),
            Entity::CompanyMetadata => company_metadata.push(condition),
        };

        for f in spec.filters() {
            for condition in compile_predicate(f.field, &f.predicate, normalizer) {
                push(f.field, condition);
            }
        }
        for e in spec.exclusions() {
            push(e.field, compile_exclusion(e.field, &e.values));
        }
    }

    if let Some(term) = spec.free_text() {
        primary.push(Condition::FreeText {
            columns: FREE_TEXT_COLUMNS,
            term: term.to_string(),
        });
    }

    // One EXISTS predicate per entity with conditions, in fixed entity order.
    // A plan flag raised only by a sort key adds no EXISTS: rows without the
    // related row still appear, ordered NULLS LAST.
    let mut exists = Vec::new();
    for (entity, conditions) in [
        (Entity::ContactMetadata, metadata),
        (Entity::Company, company),
        (Entity::CompanyMetadata, company_metadata),
    ] {
        debug_assert!(conditions.is_empty() || plan.needs_entity(entity));
        if !conditions.is_empty() {
            exists.push(ExistsPredicate { entity, conditions });
        }
    }

    let order = resolve_order(spec, plan)?;
    let (limit, offset) = resolve_window(spec, config)?;

    Ok(QueryPlan {
        base: Entity::Contact,
        conditions: primary,
        exists,
        order,
        limit,
        offset,
    })
}

fn compile_predicate(
    field: FilterField,
    predicate: &FilterPredicate,
    normalizer: &NormalizerCache,
) -> Vec<Condition> {
    let column = field.column();
    match predicate {
        FilterPredicate::Text { values, mode } => {
            let condition = match mode {
                TextMatchMode::Substring => Condition::TextContainsAny {
                    column,
                    values: values.clone(),
                },
                TextMatchMode::WordOrder => Condition::TextEqualsNormalizedAny {
                    column,
                    values: values.iter().map(|v| normalizer.sorted(v)).collect(),
                },
                TextMatchMode::WordSet => Condition::TextContainsWordsAny {
                    column,
                    phrases: values.iter().map(|v| word_tokens(v)).collect(),
                },
            };
            vec![condition]
        }
        FilterPredicate::Range { min, max } => {
            let mut out = Vec::new();
            if let Some(min) = min {
                out.push(Condition::NumberAtLeast { column, value: *min });
            }
            if let Some(max) = max {
                out.push(Condition::NumberAtMost { column, value: *max });
            }
            out
        }
        FilterPredicate::Array { values, match_all } => {
            let condition = if *match_all {
                Condition::ArrayContainsAll {
                    column,
                    values: values.clone(),
                }
            } else {
                Condition::ArrayContainsAny {
                    column,
                    values: values.clone(),
                }
            };
            vec![condition]
        }
        FilterPredicate::Domain { domains } => vec![Condition::DomainEqualsAny {
            column,
            domains: domains.iter().map(|d| registrable_domain(d)).collect(),
        }],
    }
}

fn compile_exclusion(field: FilterField, values: &[String]) -> Condition {
    use crate::schema::FilterKind;
    let column = field.column();
    match field.kind() {
        FilterKind::Array => Condition::ArrayExcludesAll {
            column,
            values: values.to_vec(),
        },
        FilterKind::Domain => Condition::DomainNotIn {
            column,
            domains: values.iter().map(|d| registrable_domain(d)).collect(),
        },
        // Exclusions on range fields are rejected at spec construction.
        FilterKind::Text | FilterKind::Range => Condition::TextNotContainsAny {
            column,
            values: values.to_vec(),
        },
    }
}

fn resolve_order(spec: &FilterSpecification, plan: &PredicatePlan) -> Result<Vec<OrderTerm>> {
    let mut order = Vec::new();

    if let Some(sort) = spec.sort() {
        let Some((entity, column)) = sort_field(&sort.field) else {
            return Err(Error::Validation(format!(
                "Unsupported sort field: {}",
                sort.field
            )));
        };
        // The planner's ordering-source tag decides direct column versus
        // scalar subquery; the catalog supplies the column itself.
        let expr = match plan.order_source {
            OrderSource::Primary => OrderExpr::Column(column),
            OrderSource::RelatedEntity
            | OrderSource::PrimaryMetadata
            | OrderSource::RelatedMetadata => OrderExpr::RelatedScalar { entity, column },
        };
        order.push(OrderTerm {
            expr,
            ascending: sort.ascending,
        });
    } else {
        order.push(OrderTerm {
            expr: OrderExpr::Column("created_at"),
            ascending: false,
        });
    }

    // Primary-key tie-break guarantees a stable order under pagination even
    // when sort values collide.
    if !order
        .iter()
        .any(|t| t.expr == OrderExpr::Column("id"))
    {
        order.push(OrderTerm {
            expr: OrderExpr::Column("id"),
            ascending: false,
        });
    }
    Ok(order)
}

fn resolve_window(spec: &FilterSpecification, config: &SearchConfig) -> Result<(usize, u64)> {
    let pagination = spec.pagination();

    let limit = pagination.page_size.unwrap_or(config.default_page_size);
    if limit > config.max_page_size {
        return Err(Error::TooCostly(format!(
            "Requested page size {} exceeds maximum of {}",
            limit, config.max_page_size
        )));
    }

    // A cursor, when present, wins over an explicit offset; both encode the
    // same thing and the cursor is what our own pagination links hand out.
    let offset = match &pagination.cursor {
        Some(token) => cursor::decode(token)?,
        None => pagination.offset.unwrap_or(0),
    };

    Ok((limit, offset))
}
