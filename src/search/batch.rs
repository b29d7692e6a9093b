//! Batched execution of large result windows.
//!
//! Result windows above the configured threshold are fetched as repeated
//! bounded sub-scans of the same plan with increasing offsets, concatenated in
//! order. This bounds per-statement memory and time without changing the row
//! sequence versus a single unbounded execution.

use crate::config::SearchConfig;
use crate::search::engine::QueryExecutor;
use crate::search::query_builder::QueryPlan;
use crate::{Error, Result};
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared with the request handler. Checked
/// between sub-batches; a cancelled fetch discards everything collected so
/// far rather than returning a silently truncated window.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fetch up to `total_limit` rows for `plan`, batching when the window
/// exceeds `config.batch_threshold`.
pub async fn fetch_window(
    executor: &dyn QueryExecutor,
    plan: &QueryPlan,
    total_limit: usize,
    config: &SearchConfig,
    cancel: &CancellationFlag,
) -> Result<Vec<JsonValue>> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    if total_limit <= config.batch_threshold {
        return executor.fetch(&plan.with_window(plan.offset, total_limit)).await;
    }

    tracing::debug!(
        total_limit,
        batch_size = config.batch_size,
        "batching large result window"
    );

    let mut rows: Vec<JsonValue> = Vec::new();
    while rows.len() < total_limit {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let batch_limit = config.batch_size.min(total_limit - rows.len());
        let sub = executor
            .fetch(&plan.with_window(plan.offset + rows.len() as u64, batch_limit))
            .await?;
        let exhausted = sub.len() < batch_limit;
        rows.extend(sub);
        if exhausted {
            break;
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Entity;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct SliceExecutor {
        rows: Vec<JsonValue>,
        calls: AtomicUsize,
        cancel_after: Option<(usize, CancellationFlag)>,
    }

    impl SliceExecutor {
        fn new(n: usize) -> Self {
            Self {
                rows: (0..n).map(|i| json!({"id": i})).collect(),
                calls: AtomicUsize::new(0),
                cancel_after: None,
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for SliceExecutor {
        async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<JsonValue>> {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((after, flag)) = &self.cancel_after {
                if calls >= *after {
                    flag.cancel();
                }
            }
            let start = (plan.offset as usize).min(self.rows.len());
            let end = (start + plan.limit).min(self.rows.len());
            Ok(self.rows[start..end].to_vec())
        }
    }

    fn empty_plan() -> QueryPlan {
        QueryPlan {
            base: Entity::Contact,
            conditions: Vec::new(),
            exists: Vec::new(),
            order: Vec::new(),
            limit: 0,
            offset: 0,
        }
    }

    fn config(threshold: usize, batch: usize) -> SearchConfig {
        SearchConfig {
            batch_threshold: threshold,
            batch_size: batch,
            ..SearchConfig::default()
        }
    }

    #[tokio::test]
    async fn small_windows_execute_once() {
        let executor = SliceExecutor::new(100);
        let rows = fetch_window(
            &executor,
            &empty_plan(),
            50,
            &config(5_000, 5_000),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 50);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn batched_window_matches_single_fetch() {
        let executor = SliceExecutor::new(50_000);
        let single = fetch_window(
            &executor,
            &empty_plan(),
            50_000,
            &config(100_000, 100_000),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

        let batched_executor = SliceExecutor::new(50_000);
        let batched = fetch_window(
            &batched_executor,
            &empty_plan(),
            50_000,
            &config(5_000, 5_000),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(batched, single);
        assert_eq!(batched_executor.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn stops_when_source_is_exhausted() {
        let executor = SliceExecutor::new(1_200);
        let rows = fetch_window(
            &executor,
            &empty_plan(),
            10_000,
            &config(500, 500),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1_200);
        // 500 + 500 + 200-row short batch; the short batch ends the loop.
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn respects_plan_base_offset() {
        let executor = SliceExecutor::new(100);
        let mut plan = empty_plan();
        plan.offset = 90;
        let rows = fetch_window(
            &executor,
            &plan,
            50,
            &config(10, 10),
            &CancellationFlag::new(),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0], json!({"id": 90}));
    }

    #[tokio::test]
    async fn cancellation_discards_partial_results() {
        let flag = CancellationFlag::new();
        let mut executor = SliceExecutor::new(10_000);
        executor.cancel_after = Some((2, flag.clone()));
        let err = fetch_window(&executor, &empty_plan(), 10_000, &config(500, 500), &flag)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        // Two sub-batches issued, none after the flag was raised.
        assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    }
}
