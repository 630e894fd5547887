//! Fan-out catalog aggregation.
//!
//! One fetch is issued per partition key. Partition failures are folded away,
//! every settlement advances progress by one, and once all partitions have
//! settled the items are deduplicated by id (last settled wins) and sorted by
//! display name. A [`CancellationToken`] stops progress reporting and result
//! assembly; fetches already in flight are detached and their output dropped.

use crate::collation::locale_compare;
use crate::error::{AggregationFailure, PartitionFetchError};
use crate::metrics::CatalogMetrics;
use crate::types::{CatalogItem, PartitionKey};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Cooperative cancellation shared between the aggregation and whoever owns
/// its lifetime. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called (immediately if it already was).
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only returns once the flag is set.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`; zero when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    pub partitions_total: usize,
    pub partitions_failed: usize,
    /// Items received before deduplication
    pub items_fetched: usize,
}

#[derive(Debug)]
pub struct Aggregation<T> {
    pub items: Vec<T>,
    pub summary: AggregationSummary,
}

#[derive(Debug)]
pub enum AggregationOutcome<T> {
    Complete(Aggregation<T>),
    /// The token fired before every partition settled. `settled` counts the
    /// settlements observed (and reported) before that.
    Cancelled { settled: usize },
}

impl<T> AggregationOutcome<T> {
    pub fn into_items(self) -> Option<Vec<T>> {
        match self {
            AggregationOutcome::Complete(aggregation) => Some(aggregation.items),
            AggregationOutcome::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AggregationOutcome::Cancelled { .. })
    }
}

/// How one partition settled.
#[derive(Debug)]
pub struct PartitionReport<T> {
    pub key: PartitionKey,
    pub result: Result<Vec<T>, PartitionFetchError>,
}

/// Drop failed partitions, keeping successful batches in settlement order.
/// Returns the batches and the number of failures.
pub fn fold_partitions<T>(reports: Vec<PartitionReport<T>>) -> (Vec<Vec<T>>, usize) {
    let mut failed = 0;
    let mut batches = Vec::with_capacity(reports.len());
    for report in reports {
        match report.result {
            Ok(items) => batches.push(items),
            Err(e) => {
                warn!(partition = %report.key, error = %e, "Partition fetch failed; skipping");
                failed += 1;
            }
        }
    }
    (batches, failed)
}

/// Merge batches by id, later batches overwriting earlier ones, then sort by
/// display name. Ties on name fall back to id, shorter ids first, so numeric
/// ids tie-break in numeric order.
pub fn merge_and_sort<T: CatalogItem>(batches: Vec<Vec<T>>) -> Vec<T> {
    let mut by_id: HashMap<String, T> = HashMap::new();
    for item in batches.into_iter().flatten() {
        by_id.insert(item.id().to_string(), item);
    }
    let mut items: Vec<T> = by_id.into_values().collect();
    items.sort_by(|a, b| {
        locale_compare(a.display_name(), b.display_name())
            .then_with(|| (a.id().len(), a.id()).cmp(&(b.id().len(), b.id())))
    });
    items
}

#[derive(Debug, Clone, Default)]
pub struct CatalogAggregator {
    max_concurrency: Option<usize>,
}

impl CatalogAggregator {
    /// Unbounded fan-out: every partition is requested at once.
    pub fn new() -> Self {
        Self {
            max_concurrency: None,
        }
    }

    /// At most `limit` partition fetches in flight; the rest wait their turn.
    pub fn with_max_concurrency(limit: usize) -> Self {
        Self {
            max_concurrency: Some(limit.max(1)),
        }
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }

    #[instrument(skip_all, fields(partitions = keys.len(), max_concurrency = ?self.max_concurrency))]
    pub async fn aggregate<T, F, Fut, P>(
        &self,
        keys: &[PartitionKey],
        fetch_partition: F,
        mut on_progress: P,
        cancel: &CancellationToken,
    ) -> Result<AggregationOutcome<T>, AggregationFailure>
    where
        T: CatalogItem + Send + 'static,
        F: Fn(PartitionKey) -> Fut,
        Fut: Future<Output = Result<Vec<T>, PartitionFetchError>> + Send + 'static,
        P: FnMut(Progress),
    {
        let total = keys.len();
        CatalogMetrics::record_run_started();

        if cancel.is_cancelled() {
            CatalogMetrics::record_run_cancelled();
            return Ok(AggregationOutcome::Cancelled { settled: 0 });
        }

        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks = JoinSet::new();
        for &key in keys {
            let fetch = fetch_partition(key);
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                if cancel.is_cancelled() {
                    // Queued behind the limiter when the run was torn down; never sent.
                    return PartitionReport {
                        key,
                        result: Err(PartitionFetchError::Other {
                            key: key.to_string(),
                            message: "cancelled before request".into(),
                        }),
                    };
                }
                PartitionReport {
                    key,
                    result: fetch.await,
                }
            });
        }
        debug!("Dispatched {} partition fetches", total);

        let mut completed = 0usize;
        let mut reports = Vec::with_capacity(total);
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = tasks.join_next() => Some(next),
            };

            let next = match joined {
                None => {
                    tasks.detach_all();
                    info!(settled = completed, total, "Aggregation cancelled");
                    CatalogMetrics::record_run_cancelled();
                    return Ok(AggregationOutcome::Cancelled { settled: completed });
                }
                Some(None) => break,
                Some(Some(next)) => next,
            };

            let report = match next {
                Ok(report) => report,
                Err(e) if e.is_panic() => {
                    warn!(error = %e, "Partition task panicked; abandoning aggregation");
                    return Err(AggregationFailure::TaskPanicked(e.to_string()));
                }
                Err(e) => return Err(AggregationFailure::TaskAborted(e.to_string())),
            };

            if cancel.is_cancelled() {
                tasks.detach_all();
                info!(settled = completed, total, "Aggregation cancelled");
                CatalogMetrics::record_run_cancelled();
                return Ok(AggregationOutcome::Cancelled { settled: completed });
            }

            completed += 1;
            match &report.result {
                Ok(items) => {
                    debug!(partition = %report.key, items = items.len(), "Partition settled");
                    CatalogMetrics::record_partition_success(items.len());
                }
                Err(_) => CatalogMetrics::record_partition_error(),
            }
            reports.push(report);
            on_progress(Progress { completed, total });
        }

        let (batches, partitions_failed) = fold_partitions(reports);
        let items_fetched = batches.iter().map(Vec::len).sum();
        let items = merge_and_sort(batches);

        info!(
            items = items.len(),
            items_fetched,
            partitions_failed,
            "Aggregation complete"
        );
        CatalogMetrics::record_run_complete(items.len());

        Ok(AggregationOutcome::Complete(Aggregation {
            items,
            summary: AggregationSummary {
                partitions_total: total,
                partitions_failed,
                items_fetched,
            },
        }))
    }
}
