//! Total extraction of response payloads.
//!
//! [`read_body`] never fails: malformed JSON, mislabeled content types and
//! unreadable bodies all degrade to text or [`Body::Empty`].

use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde_json::Value;

/// Parsed response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The body parsed as JSON.
    Json(Value),
    /// Non-JSON text.
    Text(String),
    /// Empty, unreadable, or JSON-labelled but unparseable.
    Empty,
}

impl Body {
    /// Converts the payload into a JSON value (`Empty` becomes `null`).
    pub fn into_value(self) -> Value {
        match self {
            Body::Json(value) => value,
            Body::Text(text) => Value::String(text),
            Body::Empty => Value::Null,
        }
    }
}

/// Result of reading a response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadBody {
    /// The interpreted payload.
    pub data: Body,
    /// The raw text, when the body was read as text.
    pub text: Option<String>,
}

impl ReadBody {
    fn empty() -> Self {
        Self {
            data: Body::Empty,
            text: Some(String::new()),
        }
    }
}

/// Reads and interprets the body of `response`. Never fails.
pub async fn read_body(response: Response) -> ReadBody {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(is_json_content_type)
        .unwrap_or(false);

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to read response body: {}", e);
            return ReadBody::empty();
        }
    };

    interpret(is_json, text)
}

/// Classifies an already-read body. Split from [`read_body`] so the rules
/// can be checked without a live response.
pub(crate) fn interpret(is_json: bool, text: String) -> ReadBody {
    if is_json {
        return match serde_json::from_str::<Value>(&text) {
            Ok(value) => ReadBody {
                data: Body::Json(value),
                text: None,
            },
            Err(e) => {
                if !text.trim().is_empty() {
                    tracing::warn!("Response labelled JSON failed to parse: {}", e);
                }
                ReadBody {
                    data: Body::Empty,
                    text: Some(text),
                }
            }
        };
    }

    if text.is_empty() {
        return ReadBody::empty();
    }

    if looks_like_json(&text) {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return ReadBody {
                data: Body::Json(value),
                text: Some(text),
            };
        }
    }

    ReadBody {
        data: Body::Text(text.clone()),
        text: Some(text),
    }
}

/// True for `application/json` and any `+json` media type.
pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// True when the trimmed text is delimited like a JSON object or array.
pub(crate) fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}
