pub mod client;
pub mod error;
pub mod models;
pub mod namecom;
pub mod transport;

pub use client::DnsApiClient;
pub use error::ApiError;
pub use models::{DnsRecord, RecordError, Unwrapped};
pub use namecom::{unwrap_envelope, NameComClient};
pub use transport::{HttpTransport, Method, ReqwestTransport};
