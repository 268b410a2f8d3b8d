pub mod models;

pub use models::{
    ClientConfig, RetryPolicy, API_BASE_URL, MAX_TIMEOUT_RETRIES, TIMEOUT_RETRY_SECONDS,
};
