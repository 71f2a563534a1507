use crate::types::widget_config::ConfigError;
use thiserror::Error;

/// Message shown in place of the chart when a fetch fails.
pub const FETCH_FAILED_MESSAGE: &str =
    "날씨 데이터를 불러오지 못했습니다. API 키와 네트워크 연결을 확인해 주세요.";

/// Every way a series fetch can fail. No partial results accompany an error.
#[derive(Debug, Error)]
pub enum DataFetchError {
    #[error("Invalid metric selection")]
    InvalidQuery(#[from] ConfigError),

    #[error("Environment variable {0} holding the API key is not set")]
    MissingCredential(&'static str),

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Data service reported an error: {0}")]
    Service(String),

    #[error("Data service returned no content")]
    NoContent,

    #[error("Response is not a JSON array of objects")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Response contained no records")]
    EmptyResponse,

    #[error("Record {index} does not match the requested schema: {reason}")]
    SchemaViolation { index: usize, reason: String },
}

impl DataFetchError {
    /// The short localized message presented to users.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}
