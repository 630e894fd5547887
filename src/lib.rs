pub mod aggregator;
pub mod collation;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod types;

// Application services and their adapters
pub mod app;
pub mod infra;

pub use aggregator::{
    Aggregation, AggregationOutcome, AggregationSummary, CancellationToken, CatalogAggregator,
    Progress,
};
pub use filter::QueryFilter;
pub use types::{CatalogItem, Drink, PartitionKey, Searchable};
