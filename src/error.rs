use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrinkifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("No drink returned")]
    NoDrink,

    #[error(transparent)]
    Aggregation(#[from] AggregationFailure),
}

/// Failure of a single partition fetch. Always absorbed by the aggregator.
#[derive(Error, Debug)]
pub enum PartitionFetchError {
    #[error("request for partition '{key}' failed: {source}")]
    Transport {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} on partition '{key}'")]
    Status { key: String, status: u16 },

    #[error("malformed payload for partition '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("partition '{key}': {message}")]
    Other { key: String, message: String },
}

/// Catch-all failure outside the per-partition scope. Carries no partial result.
#[derive(Error, Debug)]
pub enum AggregationFailure {
    #[error("partition task panicked: {0}")]
    TaskPanicked(String),

    #[error("partition task was aborted: {0}")]
    TaskAborted(String),
}

pub type Result<T> = std::result::Result<T, DrinkifyError>;
