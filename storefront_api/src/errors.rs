//! Error types for the API client.

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;

use crate::body::{Body, ReadBody};

/// Payload fields checked, in order, for a human-readable message.
const MESSAGE_FIELDS: [&str; 2] = ["message", "mensagem"];

/// Payload fields checked, in order, for a correlation id.
const REQUEST_ID_FIELDS: [&str; 2] = ["requestId", "request_id"];

/// Response headers checked, in order, for a correlation id.
const REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "x-correlation-id", "request-id"];

/// Longest raw-text fallback kept as an error message.
const MAX_TEXT_MESSAGE: usize = 2000;

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The backend answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The HTTP call itself failed (DNS, connection refused, timeout).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The resolved request URL could not be parsed.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The request method is not a valid HTTP token.
    #[error("Invalid HTTP method {0:?}")]
    InvalidMethod(String),
    /// A caller-supplied header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// An option that the chosen entry point cannot honor.
    #[error("Invalid request option: {0}")]
    InvalidOption(&'static str),
    /// A typed request body could not be serialized to JSON.
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),
    /// A successful payload did not match the requested type.
    #[error("Failed to decode response payload: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// HTTP status associated with this error, or `0` when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            Self::Api(e) => e.status,
            Self::Transport(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
            _ => 0,
        }
    }

    /// Borrows the structured error when the backend produced one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// True when no HTTP response was involved (network-level failure).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Structured error built from a non-2xx response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Human-readable message. Never empty.
    pub message: String,
    /// Short machine-readable code from the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Diagnostic payload: the `details` field, or the whole payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Correlation id from the payload or response headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Request URL as resolved from base and path, plus any encoded query.
    pub url: String,
}

impl ApiError {
    /// Builds the structured error for a failed response from its status,
    /// headers and already-read body.
    pub fn from_response_parts(status: u16, headers: &HeaderMap, body: &ReadBody, url: &str) -> Self {
        let payload = match &body.data {
            Body::Json(value) => Some(value),
            _ => None,
        };

        let message = payload
            .and_then(|p| first_string_field(p, &MESSAGE_FIELDS))
            .or_else(|| match &body.data {
                Body::Json(Value::String(s)) => non_empty(s),
                Body::Text(s) => non_empty(s).map(|m| truncate_message(&m)),
                _ => None,
            })
            .or_else(|| match (&body.data, body.text.as_deref()) {
                (Body::Json(_), _) | (_, None) => None,
                (_, Some(text)) => non_empty(text).map(|m| truncate_message(&m)),
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        let code = payload.and_then(|p| match p.get("code") {
            Some(Value::String(s)) => non_empty(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });

        let details = match payload.and_then(|p| p.get("details")) {
            Some(details) => Some(details.clone()),
            None => match body.data.clone().into_value() {
                Value::Null => None,
                whole => Some(whole),
            },
        };

        let request_id = payload
            .and_then(|p| first_string_field(p, &REQUEST_ID_FIELDS))
            .or_else(|| request_id_from_headers(headers));

        Self {
            status,
            message,
            code,
            details,
            request_id,
            url: url.to_string(),
        }
    }
}

fn first_string_field(payload: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match payload.get(*field) {
        Some(Value::String(s)) => non_empty(s),
        _ => None,
    })
}

fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(non_empty)
    })
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn truncate_message(message: &str) -> String {
    match message.char_indices().nth(MAX_TEXT_MESSAGE) {
        Some((idx, _)) => format!("{}...[truncated]", &message[..idx]),
        None => message.to_string(),
    }
}
