use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("sample {index} has a non-finite weight ({weight})")]
    NonFiniteWeight { index: usize, weight: f64 },

    #[error("sample {index} is dated {current}, before the previous sample ({previous})")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to data source failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("data source returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid data source URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to decode data source response: {0}")]
    Decode(#[from] serde_json::Error),
}
