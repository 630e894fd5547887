use crate::app::ports::DrinkSourcePort;
use crate::config::ApiConfig;
use crate::constants::{RANDOM_PATH, SEARCH_BY_FIRST_CHAR_PATH};
use crate::error::{DrinkifyError, PartitionFetchError, Result};
use crate::metrics::CatalogMetrics;
use crate::types::{Drink, DrinksEnvelope, PartitionKey};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// TheCocktailDB over HTTP
pub struct CocktailDbHttp {
    client: reqwest::Client,
    base_url: String,
}

impl CocktailDbHttp {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// The search endpoint answers some misses with an empty body instead of
    /// `{"drinks":null}`; both mean "no drinks".
    fn parse_envelope(bytes: &[u8]) -> std::result::Result<DrinksEnvelope, serde_json::Error> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(DrinksEnvelope { drinks: None });
        }
        serde_json::from_slice(bytes)
    }
}

#[async_trait]
impl DrinkSourcePort for CocktailDbHttp {
    #[instrument(skip(self), fields(partition = %key))]
    async fn fetch_partition(
        &self,
        key: PartitionKey,
    ) -> std::result::Result<Vec<Drink>, PartitionFetchError> {
        let started = Instant::now();
        let resp = self
            .client
            .get(self.endpoint(SEARCH_BY_FIRST_CHAR_PATH))
            .query(&[("f", key.to_string())])
            .send()
            .await
            .map_err(|source| PartitionFetchError::Transport {
                key: key.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PartitionFetchError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|source| PartitionFetchError::Transport {
                key: key.to_string(),
                source,
            })?;
        CatalogMetrics::record_partition_duration(started.elapsed().as_secs_f64());

        let drinks = Self::parse_envelope(&bytes)
            .map_err(|source| PartitionFetchError::Malformed {
                key: key.to_string(),
                source,
            })?
            .into_drinks();
        debug!("Fetched {} drinks ({} bytes)", drinks.len(), bytes.len());
        Ok(drinks)
    }

    #[instrument(skip(self))]
    async fn random(&self) -> Result<Drink> {
        let resp = self.client.get(self.endpoint(RANDOM_PATH)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DrinkifyError::Api {
                message: format!("HTTP {} from random endpoint", status.as_u16()),
            });
        }
        let bytes = resp.bytes().await?;
        let envelope: DrinksEnvelope = serde_json::from_slice(&bytes)?;
        envelope
            .into_drinks()
            .into_iter()
            .next()
            .ok_or(DrinkifyError::NoDrink)
    }
}
