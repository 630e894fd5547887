use crate::aggregator::{AggregationOutcome, CancellationToken, CatalogAggregator, Progress};
use crate::app::ports::DrinkSourcePort;
use crate::constants::partition_tokens;
use crate::error::{AggregationFailure, Result};
use crate::metrics::CatalogMetrics;
use crate::types::{Drink, PartitionKey};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Loads the whole catalog or a single random drink from a `DrinkSourcePort`.
pub struct CatalogUseCase<S: DrinkSourcePort + ?Sized> {
    source: Arc<S>,
    aggregator: CatalogAggregator,
    keys: Vec<PartitionKey>,
}

impl<S: DrinkSourcePort + ?Sized + 'static> CatalogUseCase<S> {
    /// Uses the full letter-and-digit partition set.
    pub fn new(source: Arc<S>, aggregator: CatalogAggregator) -> Self {
        Self {
            source,
            aggregator,
            keys: partition_tokens().into_iter().map(PartitionKey).collect(),
        }
    }

    pub fn with_keys(mut self, keys: Vec<PartitionKey>) -> Self {
        self.keys = keys;
        self
    }

    pub fn partition_count(&self) -> usize {
        self.keys.len()
    }

    /// Aggregate every partition. Call once per activation; cancel `cancel`
    /// on teardown.
    #[instrument(skip_all)]
    pub async fn load_all<P>(
        &self,
        on_progress: P,
        cancel: &CancellationToken,
    ) -> std::result::Result<AggregationOutcome<Drink>, AggregationFailure>
    where
        P: FnMut(Progress),
    {
        let source = Arc::clone(&self.source);
        self.aggregator
            .aggregate(
                &self.keys,
                move |key| {
                    let source = Arc::clone(&source);
                    async move { source.fetch_partition(key).await }
                },
                on_progress,
                cancel,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn random(&self) -> Result<Drink> {
        match self.source.random().await {
            Ok(drink) => {
                CatalogMetrics::record_random(true);
                info!(id = %drink.id, name = %drink.name, "Fetched random drink");
                Ok(drink)
            }
            Err(e) => {
                CatalogMetrics::record_random(false);
                warn!("Random drink fetch failed: {}", e);
                Err(e)
            }
        }
    }
}
