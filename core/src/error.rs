use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error codes used across the tool surface
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const RESOURCE_NOT_FOUND: &str = "resource_not_found";
    pub const TRANSPORT_ERROR: &str = "transport_error";
    pub const UNKNOWN_TOOL: &str = "unknown_tool";
    pub const MISSING_CONFIGURATION: &str = "missing_configuration";
}

/// Structured answer for a resource lookup miss.
/// It is returned as a regular payload so the caller can pick one of the
/// candidates and retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLookupError {
    /// Agent-readable description, including the candidate names when present
    pub error: String,
    /// Resources whose name contains the requested one (omitted when none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<String>>,
}

/// A search request that violates its own invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("'customer_id' must not be empty")]
    EmptyCustomerId,
    #[error("'fields' must contain at least one field")]
    EmptyFields,
    #[error("'fields' item {index} must not be empty")]
    EmptyField { index: usize },
    #[error("'resource' must not be empty")]
    EmptyResource,
    #[error("'limit' must be a non-negative integer, got '{received}'")]
    InvalidLimit { received: String },
}

impl RequestError {
    /// Name of the request field that caused the error.
    pub fn field(&self) -> &'static str {
        match self {
            RequestError::EmptyCustomerId => "customer_id",
            RequestError::EmptyFields | RequestError::EmptyField { .. } => "fields",
            RequestError::EmptyResource => "resource",
            RequestError::InvalidLimit { .. } => "limit",
        }
    }
}

/// Failures raised by the reporting API transport. The executor hands these
/// back to its caller untouched; retry policy belongs to the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to reach the reporting API: {0}")]
    Http(String),
    #[error("reporting API returned status {status}")]
    Status { status: u16, body: Value },
    #[error("failed to decode search response: {0}")]
    Decode(String),
    #[error("failed to obtain credentials: {0}")]
    Auth(String),
}

impl TransportError {
    /// HTTP status of the failed call, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
