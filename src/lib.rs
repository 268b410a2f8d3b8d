//! Client for the name.com DNS management API.
//!
//! [`NameComClient`] lists, creates, finds, replaces and deletes DNS records
//! and updates a domain's nameservers. Network and API failures are logged
//! through the `log` facade and reported as empty results, `None` or `false`.
//! Record rows the server sends that cannot be rebuilt are returned as
//! [`RecordError`].
//!
//! ```no_run
//! use namecom_dns::{ClientConfig, DnsApiClient, DnsRecord, NameComClient};
//!
//! # async fn repoint() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NameComClient::new(ClientConfig::new("user", "token"))?;
//! let record = DnsRecord::new("example.com", "www", "lb-1.example.net");
//! client
//!     .update_record("example.com", "lb-0.example.net", &record)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;

pub use api::{
    unwrap_envelope, ApiError, DnsApiClient, DnsRecord, HttpTransport, Method, NameComClient,
    RecordError, ReqwestTransport, Unwrapped,
};
pub use config::{ClientConfig, RetryPolicy};

#[cfg(test)]
mod tests;
