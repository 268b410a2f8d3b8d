use std::fmt;

use super::{
    client::DnsApiClient,
    error::ApiError,
    models::*,
    transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError},
};
use crate::config::{ClientConfig, RetryPolicy};
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use tokio::time::sleep;

const USERNAME_HEADER: &str = "Api-Username";
const TOKEN_HEADER: &str = "Api-Token";

/// Client for the name.com DNS API.
pub struct NameComClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    username: String,
    headers: HeaderMap,
    retry: RetryPolicy,
}

impl NameComClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> NameComClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        let headers = build_headers(&config.username, &config.token)?;

        Ok(Self {
            transport,
            base_url: config.normalized_base_url().to_string(),
            username: config.username,
            headers,
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn dns_url(&self, action: &str, domain: &str) -> String {
        format!("{}/dns/{}/{}", self.base_url, action, domain)
    }

    fn domain_url(&self, action: &str, domain: &str) -> String {
        format!("{}/domain/{}/{}", self.base_url, action, domain)
    }

    /// Sends one request, retrying only when the transport times out.
    ///
    /// Each timed-out attempt is followed by the policy's fixed pause. Any
    /// status other than 200 is an error carrying the body, or the reason
    /// phrase when the body is not text. The envelope is left untouched.
    pub async fn execute_request(
        &self,
        url: &str,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        let body = payload.map(serde_json::to_string).transpose()?;
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: self.headers.clone(),
            body,
        };

        for attempt in 1..=self.retry.max_attempts {
            debug!("{method} {url} (attempt {attempt})");
            match self.transport.send(&request).await {
                Ok(response) => return check_status(method, url, response),
                Err(TransportError::Timeout) => {
                    warn!("Timeout error getting {url}, retry...");
                    sleep(self.retry.backoff()).await;
                }
                Err(TransportError::Other(detail)) => {
                    let e = ApiError::Transport {
                        url: url.to_string(),
                        detail,
                    };
                    error!("{e}");
                    return Err(e);
                }
            }
        }

        let e = ApiError::MaxRetriesExceeded {
            url: url.to_string(),
            attempts: self.retry.max_attempts,
        };
        error!("{e}");
        Err(e)
    }

    async fn call(
        &self,
        operation: &str,
        url: &str,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Unwrapped, ApiError> {
        let response = self.execute_request(url, method, payload).await?;
        unwrap_envelope(&response, operation)
    }
}

/// Strips the `result` block from a 200 response.
///
/// Code 100 is success: an otherwise empty body yields [`Unwrapped::Done`],
/// anything else is returned as the payload. Other codes are logged with the
/// server's message and returned as [`ApiError::Vendor`].
pub fn unwrap_envelope(response: &HttpResponse, operation: &str) -> Result<Unwrapped, ApiError> {
    let parsed: ApiResponse = serde_json::from_slice(&response.body).map_err(|e| {
        let e = ApiError::InvalidResponse {
            operation: operation.to_string(),
            detail: e.to_string(),
        };
        error!("{e}");
        e
    })?;

    if parsed.result.code == SUCCESS_CODE {
        if parsed.payload.is_empty() {
            return Ok(Unwrapped::Done);
        }
        return Ok(Unwrapped::Payload(parsed.payload));
    }

    let e = ApiError::Vendor {
        operation: operation.to_string(),
        code: parsed.result.code,
        message: parsed.result.message.unwrap_or_default(),
    };
    error!("{e}");
    Err(e)
}

fn check_status(method: Method, url: &str, response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().map_or_else(
        || {
            response
                .status
                .canonical_reason()
                .unwrap_or_default()
                .to_string()
        },
        str::to_string,
    );
    let e = ApiError::RequestFailed {
        method,
        url: url.to_string(),
        status: response.status.as_u16(),
        body,
    };
    error!("{e}");
    Err(e)
}

fn build_headers(username: &str, token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let username = HeaderValue::from_str(username).map_err(|source| ApiError::InvalidHeader {
        name: USERNAME_HEADER,
        source,
    })?;
    let mut token = HeaderValue::from_str(token).map_err(|source| ApiError::InvalidHeader {
        name: TOKEN_HEADER,
        source,
    })?;
    token.set_sensitive(true);

    headers.insert(USERNAME_HEADER, username);
    headers.insert(TOKEN_HEADER, token);
    Ok(headers)
}

/// Turns the `records` array of a list payload into records of `domain`.
///
/// One row that cannot be rebuilt fails the whole list.
fn records_from_payload(
    domain: &str,
    mut payload: Map<String, Value>,
) -> Result<Vec<DnsRecord>, RecordError> {
    let rows = match payload.remove("records") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(RecordError::InvalidField {
                field: "records",
                value: other.to_string(),
            })
        }
    };

    rows.into_iter()
        .map(|row| match row {
            Value::Object(row) => record_from_row(domain, row),
            other => Err(RecordError::NotAnObject(other.to_string())),
        })
        .collect()
}

// The server leaves the domain out of every row.
fn record_from_row(domain: &str, mut row: Map<String, Value>) -> Result<DnsRecord, RecordError> {
    row.insert("domain".to_string(), Value::String(domain.to_string()));
    DnsRecord::from_raw(row)
}

#[async_trait]
impl<T: HttpTransport> DnsApiClient for NameComClient<T> {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, RecordError> {
        let url = self.dns_url("list", domain);
        match self.call("list_records", &url, Method::Get, None).await {
            Ok(Unwrapped::Payload(payload)) => records_from_payload(domain, payload)
                .inspect_err(|e| error!("Malformed record in list_records: {e}")),
            Ok(Unwrapped::Done) | Err(_) => Ok(Vec::new()),
        }
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> bool {
        let url = self.dns_url("delete", domain);
        let payload = json!({ "record_id": record_id });
        self.call("delete_record", &url, Method::Post, Some(&payload))
            .await
            .is_ok()
    }

    async fn create_record(
        &self,
        domain: &str,
        record: &DnsRecord,
    ) -> Result<Option<DnsRecord>, RecordError> {
        let url = self.dns_url("create", domain);
        let payload = match serde_json::to_value(record.to_create_payload()) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error in create_record: {e}");
                return Ok(None);
            }
        };

        let Ok(Unwrapped::Payload(created)) = self
            .call("create_record", &url, Method::Post, Some(&payload))
            .await
        else {
            return Ok(None);
        };

        record_from_row(domain, created)
            .map(Some)
            .inspect_err(|e| error!("Malformed record in create_record: {e}"))
    }

    async fn update_nameservers(&self, domain: &str, nameservers: &[String]) -> bool {
        let url = self.domain_url("update_nameservers", domain);
        let payload = json!({ "nameservers": nameservers });
        self.call("update_nameservers", &url, Method::Post, Some(&payload))
            .await
            .is_ok()
    }

    async fn domain_exists(&self, domain: &str) -> bool {
        self.get_domain_info(domain).await.is_some()
    }

    async fn get_domain_info(&self, domain: &str) -> Option<Map<String, Value>> {
        let url = self.domain_url("get", domain);
        self.call("get_domain", &url, Method::Get, None)
            .await
            .ok()
            .map(|unwrapped| unwrapped.into_payload().unwrap_or_default())
    }
}

impl<T> fmt::Display for NameComClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base_url, self.username)
    }
}
