//! Metrics for catalog fetches.
//!
//! Recording is always safe: without an installed recorder the `metrics`
//! macros are no-ops. `init_metrics` installs an in-process Prometheus
//! recorder so a short-lived CLI run can print its numbers on exit.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Every metric name the crate records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    PartitionFetchSuccess,
    PartitionFetchError,
    PartitionFetchDuration,
    PartitionItems,
    AggregationRuns,
    AggregationCancelled,
    AggregationItems,
    RandomFetchSuccess,
    RandomFetchError,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PartitionFetchSuccess => "drinkify_partition_fetch_success_total",
            MetricName::PartitionFetchError => "drinkify_partition_fetch_error_total",
            MetricName::PartitionFetchDuration => "drinkify_partition_fetch_duration_seconds",
            MetricName::PartitionItems => "drinkify_partition_items",
            MetricName::AggregationRuns => "drinkify_aggregation_runs_total",
            MetricName::AggregationCancelled => "drinkify_aggregation_cancelled_total",
            MetricName::AggregationItems => "drinkify_aggregation_items",
            MetricName::RandomFetchSuccess => "drinkify_random_fetch_success_total",
            MetricName::RandomFetchError => "drinkify_random_fetch_error_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle already set");
            }
            CatalogMetrics::register();
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    });
}

/// Prometheus text exposition of everything recorded so far, if a recorder
/// was installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

pub struct CatalogMetrics;

impl CatalogMetrics {
    fn register() {
        // Touch every series so zero-valued counters still show up
        let _ = ::metrics::counter!(MetricName::PartitionFetchSuccess.as_str());
        let _ = ::metrics::counter!(MetricName::PartitionFetchError.as_str());
        let _ = ::metrics::counter!(MetricName::AggregationRuns.as_str());
        let _ = ::metrics::counter!(MetricName::AggregationCancelled.as_str());
        let _ = ::metrics::counter!(MetricName::RandomFetchSuccess.as_str());
        let _ = ::metrics::counter!(MetricName::RandomFetchError.as_str());
    }

    pub fn record_partition_success(items: usize) {
        ::metrics::counter!(MetricName::PartitionFetchSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::PartitionItems.as_str()).record(items as f64);
    }

    pub fn record_partition_error() {
        ::metrics::counter!(MetricName::PartitionFetchError.as_str()).increment(1);
    }

    pub fn record_partition_duration(duration_secs: f64) {
        ::metrics::histogram!(MetricName::PartitionFetchDuration.as_str()).record(duration_secs);
    }

    pub fn record_run_started() {
        ::metrics::counter!(MetricName::AggregationRuns.as_str()).increment(1);
    }

    pub fn record_run_cancelled() {
        ::metrics::counter!(MetricName::AggregationCancelled.as_str()).increment(1);
    }

    pub fn record_run_complete(items: usize) {
        ::metrics::gauge!(MetricName::AggregationItems.as_str()).set(items as f64);
    }

    pub fn record_random(success: bool) {
        let name = if success {
            MetricName::RandomFetchSuccess
        } else {
            MetricName::RandomFetchError
        };
        ::metrics::counter!(name.as_str()).increment(1);
    }
}
