//! Search engine orchestration.
//!
//! Drives one request through the pipeline: predicate planning, query
//! compilation, cache consultation, batched execution, page assembly. The
//! engine owns only configuration and the bounded normalizer cache; the
//! database executor and query cache are injected per call and never retained.

use crate::config::SearchConfig;
use crate::search::batch::{self, CancellationFlag};
use crate::search::cache::{cache_key, QueryCache};
use crate::search::cursor;
use crate::search::normalize::NormalizerCache;
use crate::search::planner;
use crate::search::query_builder::{self, QueryPlan};
use crate::search::spec::FilterSpecification;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Database collaborator: executes an abstract plan and returns rows. The
/// implementation owns statement construction (see `query_builder::postgres`
/// for the Postgres rendering), connection pooling and timeouts.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<JsonValue>>;
}

/// One ordered page of primary-entity rows plus pagination state.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub rows: Vec<JsonValue>,
    /// Whether rows exist beyond this page.
    pub has_more: bool,
    /// Offset of the first row after this page.
    pub next_offset: u64,
    /// Opaque token for the next page; present iff `has_more`.
    pub next_cursor: Option<String>,
    /// Opaque token for the previous page; present unless on the first page.
    pub prev_cursor: Option<String>,
}

pub struct SearchEngine {
    config: SearchConfig,
    normalizer: NormalizerCache,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            normalizer: NormalizerCache::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Execute a search request end to end.
    ///
    /// The cache is optional and its absence (or any miss) changes nothing
    /// but latency. Cancellation is honored between batched sub-scans.
    pub async fn search(
        &self,
        executor: &dyn QueryExecutor,
        cache: Option<&dyn QueryCache>,
        spec: &FilterSpecification,
        cancel: &CancellationFlag,
    ) -> Result<SearchPage> {
        let plan = planner::plan(spec);
        let plan = query_builder::compile(spec, &plan, &self.config, &self.normalizer)?;

        // Fetch one row past the page to learn whether more exist.
        let window = plan.limit + 1;
        let key = cache_key(spec);

        let mut rows = match cache {
            Some(cache) => cache.get(&key).await,
            None => None,
        };
        match &rows {
            Some(hit) => tracing::debug!(key = %key, rows = hit.len(), "query cache hit"),
            None => tracing::debug!(key = %key, "query cache miss"),
        }

        if rows.is_none() {
            let fetched = batch::fetch_window(executor, &plan, window, &self.config, cancel).await?;
            if let Some(cache) = cache {
                cache
                    .set(
                        &key,
                        fetched.clone(),
                        Duration::from_secs(self.config.cache_ttl_secs),
                    )
                    .await;
            }
            rows = Some(fetched);
        }
        let mut rows = rows.unwrap_or_default();

        let has_more = rows.len() > plan.limit;
        rows.truncate(plan.limit);

        let next_offset = plan.offset + rows.len() as u64;
        let next_cursor = has_more.then(|| cursor::encode(next_offset));
        let prev_cursor = (plan.offset > 0)
            .then(|| cursor::encode(plan.offset.saturating_sub(plan.limit as u64)));

        Ok(SearchPage {
            rows,
            has_more,
            next_offset,
            next_cursor,
            prev_cursor,
        })
    }
}
