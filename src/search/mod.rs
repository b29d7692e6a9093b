//! Search pipeline: specification, planning, compilation, execution.
//!
//! Data flow:
//! `FilterSpecification -> PredicatePlan -> QueryPlan -> (cache) -> batched
//! execution -> SearchPage`. The Apollo URL mapper is an alternate entry point
//! producing the same `FilterSpecification` type.

pub mod apollo;
pub mod batch;
pub mod cache;
pub mod cursor;
pub mod engine;
pub mod normalize;
pub mod planner;
pub mod query_builder;
pub mod spec;

pub use engine::{QueryExecutor, SearchEngine, SearchPage};
pub use planner::{plan, OrderSource, PredicatePlan};
pub use query_builder::{compile, Condition, ExistsPredicate, OrderExpr, QueryPlan};
pub use spec::{FilterPredicate, FilterSpecification, Pagination, SortSpec, TextMatchMode};
