use thiserror::Error;

use super::transport::Method;

/// Everything that can go wrong between building a request and unwrapping
/// the response envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Max retries ({attempts}) getting {url}")]
    MaxRetriesExceeded { url: String, attempts: u32 },

    #[error("Transport error getting {url}: {detail}")]
    Transport { url: String, detail: String },

    #[error("Error {status} in request {method} {url}: {body}")]
    RequestFailed {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response in {operation}: {detail}")]
    InvalidResponse { operation: String, detail: String },

    #[error("Error in {operation} method: {message}")]
    Vendor {
        operation: String,
        code: i64,
        message: String,
    },

    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid value for header {name}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
