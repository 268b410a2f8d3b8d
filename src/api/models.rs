use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use validator::Validate;

/// Envelope code the API uses for a successful call.
pub const SUCCESS_CODE: i64 = 100;

const DEFAULT_RECORD_TYPE: &str = "CNAME";
const DEFAULT_TTL: u32 = 300;

/// One DNS record scoped to a domain.
///
/// `record_id` and `create_date` are assigned by the server; a record built
/// locally for a create call leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct DnsRecord {
    pub record_id: Option<String>,
    pub domain: String,
    pub hostname: Option<String>,
    #[validate(length(min = 1, message = "Record type cannot be empty"))]
    pub record_type: String,
    pub content: String,
    #[validate(range(min = 1, message = "TTL must be greater than 0"))]
    pub ttl: u32,
    pub priority: Option<u32>,
    pub create_date: Option<String>,
}

impl Default for DnsRecord {
    fn default() -> Self {
        Self {
            record_id: None,
            domain: String::new(),
            hostname: None,
            record_type: DEFAULT_RECORD_TYPE.to_string(),
            content: String::new(),
            ttl: DEFAULT_TTL,
            priority: None,
            create_date: None,
        }
    }
}

/// Body of a `/dns/create` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRecordPayload<'a> {
    pub hostname: Option<&'a str>,
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub content: &'a str,
    pub ttl: u32,
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("raw record is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("raw record field `{field}` has an unexpected value: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("raw record is not an object: {0}")]
    NotAnObject(String),
}

impl DnsRecord {
    /// A record with the default type (`CNAME`), TTL (300) and no priority.
    pub fn new(
        domain: impl Into<String>,
        hostname: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            hostname: Some(hostname.into()),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn to_create_payload(&self) -> CreateRecordPayload<'_> {
        CreateRecordPayload {
            hostname: self.hostname.as_deref(),
            record_type: &self.record_type,
            content: &self.content,
            ttl: self.ttl,
            priority: self.priority,
        }
    }

    /// Rebuilds a record from a server row.
    ///
    /// The server names the record type `type` and the hostname `name`;
    /// both keys must be present. `updated_date` and `create_date` both map
    /// onto `create_date`.
    pub fn from_raw(mut raw: Map<String, Value>) -> Result<Self, RecordError> {
        let record_type = match raw.remove("type") {
            Some(Value::String(record_type)) => record_type,
            Some(other) => {
                return Err(RecordError::InvalidField {
                    field: "type",
                    value: other.to_string(),
                })
            }
            None => return Err(RecordError::MissingField("type")),
        };
        let hostname = match raw.remove("name") {
            Some(name) => scalar_to_string("name", name)?,
            None => return Err(RecordError::MissingField("name")),
        };

        let create_date = match raw.remove("create_date") {
            Some(date) if !date.is_null() => scalar_to_string("create_date", date)?,
            _ => take_string(&mut raw, "updated_date")?,
        };

        Ok(Self {
            record_id: take_string(&mut raw, "record_id")?,
            domain: take_string(&mut raw, "domain")?.unwrap_or_default(),
            hostname,
            record_type,
            content: take_string(&mut raw, "content")?.unwrap_or_default(),
            ttl: take_u32(&mut raw, "ttl")?.unwrap_or(DEFAULT_TTL),
            priority: take_u32(&mut raw, "priority")?,
            create_date,
        })
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ({})",
            self.hostname.as_deref().unwrap_or_default(),
            self.domain,
            self.record_type
        )
    }
}

fn scalar_to_string(field: &'static str, value: Value) -> Result<Option<String>, RecordError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(RecordError::InvalidField {
            field,
            value: other.to_string(),
        }),
    }
}

fn take_string(
    raw: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, RecordError> {
    raw.remove(field)
        .map_or(Ok(None), |value| scalar_to_string(field, value))
}

// The API is inconsistent about sending numbers as JSON numbers or strings.
fn take_u32(raw: &mut Map<String, Value>, field: &'static str) -> Result<Option<u32>, RecordError> {
    let invalid = |value: &Value| RecordError::InvalidField {
        field,
        value: value.to_string(),
    };
    match raw.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(&Value::Number(n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| invalid(&Value::String(s))),
        Some(other) => Err(invalid(&other)),
    }
}

/// The `result` block every response carries.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultStatus {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// A decoded response: the status block plus whatever else the server sent.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub result: ResultStatus,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// A successful envelope with its `result` block removed.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwrapped {
    /// The call succeeded and the server sent nothing besides the status.
    Done,
    Payload(Map<String, Value>),
}

impl Unwrapped {
    pub fn into_payload(self) -> Option<Map<String, Value>> {
        match self {
            Self::Done => None,
            Self::Payload(payload) => Some(payload),
        }
    }
}
