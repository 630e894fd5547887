use crate::error::{PartitionFetchError, Result};
use crate::types::{Drink, PartitionKey};
use async_trait::async_trait;

/// Remote source of drink records
#[async_trait]
pub trait DrinkSourcePort: Send + Sync {
    /// All drinks whose name starts with `key`. An empty partition is `Ok(vec![])`.
    async fn fetch_partition(&self, key: PartitionKey) -> std::result::Result<Vec<Drink>, PartitionFetchError>;

    /// One randomly chosen drink
    async fn random(&self) -> Result<Drink>;
}
