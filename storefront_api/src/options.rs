//! Per-request options: method, headers, body, credentials and pass-through settings.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart;
use serde::Serialize;
use serde_json::Value;

use crate::{body::looks_like_json, Error};

/// Whether cookies from the client's jar accompany a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Always send and store cookies. This is the default.
    #[default]
    Include,
    /// Send cookies only when the request targets the base URL's origin.
    SameOrigin,
    /// Never send or store cookies.
    Omit,
}

/// Request payload.
#[derive(Debug)]
pub enum RequestBody {
    /// Serialized with `serde_json` and sent as `application/json`.
    Json(Value),
    /// Sent verbatim. Marked as JSON when it looks like a JSON object or array.
    Text(String),
    /// Opaque bytes, sent without a forced content type.
    Bytes(Vec<u8>),
    /// URL-encoded key/value pairs.
    Form(Vec<(String, String)>),
    /// Multipart form; the transport picks the boundary.
    Multipart(multipart::Form),
}

impl RequestBody {
    /// Serializes any value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(Error::Serialize)
    }

    /// Whether this body should carry `Content-Type: application/json`.
    pub(crate) fn wants_json_content_type(&self, skip_content_type: bool) -> bool {
        match self {
            RequestBody::Json(_) => true,
            RequestBody::Text(text) => !skip_content_type && looks_like_json(text),
            RequestBody::Bytes(_) | RequestBody::Form(_) | RequestBody::Multipart(_) => false,
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<multipart::Form> for RequestBody {
    fn from(form: multipart::Form) -> Self {
        RequestBody::Multipart(form)
    }
}

/// Options accepted by [`Client::execute`](crate::Client::execute) and friends.
///
/// Built fluently:
///
/// ```
/// use storefront_api::{Credentials, RequestOptions};
///
/// let opts = RequestOptions::new()
///     .method("post")
///     .header("x-tenant", "store-1")
///     .credentials(Credentials::SameOrigin);
/// ```
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// HTTP method. `GET` when unset; upper-cased before use.
    pub method: Option<String>,
    /// Caller headers, merged over the defaults.
    pub headers: HeaderMap,
    /// Request payload.
    pub body: Option<RequestBody>,
    /// Return the live response without reading its body.
    pub raw: bool,
    /// Overrides the client's base URL for this request.
    pub base_url: Option<String>,
    /// Do not infer a JSON content type for text bodies.
    pub skip_content_type: bool,
    /// Cookie policy. `Include` when unset.
    pub credentials: Option<Credentials>,
    /// Per-request timeout handed to the transport.
    pub timeout: Option<Duration>,
    /// Query parameters appended to the resolved URL.
    pub query: Vec<(String, String)>,
    pub(crate) invalid_header: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Adds a header. An invalid name or value is reported when the request runs.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                self.invalid_header.get_or_insert_with(|| name.to_string());
            }
        }
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn skip_content_type(mut self, skip: bool) -> Self {
        self.skip_content_type = skip;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The method to send: upper-cased, `GET` when unset.
    pub(crate) fn resolved_method(&self) -> Result<reqwest::Method, Error> {
        let method = self
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_ascii_uppercase();
        reqwest::Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_defaults_to_get_and_is_uppercased() {
        assert_eq!(RequestOptions::new().resolved_method().unwrap(), reqwest::Method::GET);
        assert_eq!(
            RequestOptions::new().method("patch").resolved_method().unwrap(),
            reqwest::Method::PATCH
        );
    }

    #[test]
    fn invalid_method_is_rejected() {
        let err = RequestOptions::new().method("no pe").resolved_method().unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(m) if m == "NO PE"));
    }

    #[test]
    fn invalid_header_is_remembered() {
        let opts = RequestOptions::new().header("bad header", "x").header("x-ok", "1");
        assert_eq!(opts.invalid_header.as_deref(), Some("bad header"));
        assert_eq!(opts.headers.get("x-ok").unwrap(), "1");
    }

    #[test]
    fn json_content_type_inference() {
        assert!(RequestBody::Json(json!({"a": 1})).wants_json_content_type(true));
        assert!(RequestBody::Text("[1]".into()).wants_json_content_type(false));
        assert!(!RequestBody::Text("[1]".into()).wants_json_content_type(true));
        assert!(!RequestBody::Text("a=1".into()).wants_json_content_type(false));
        assert!(!RequestBody::Bytes(vec![1, 2]).wants_json_content_type(false));
        assert!(!RequestBody::Form(vec![]).wants_json_content_type(false));
    }

    #[test]
    fn serializable_values_become_json_bodies() {
        #[derive(Serialize)]
        struct Coupon<'a> {
            code: &'a str,
            percent: u8,
        }
        let body = RequestBody::json(&Coupon { code: "BF10", percent: 10 }).unwrap();
        assert!(matches!(body, RequestBody::Json(v) if v == json!({"code": "BF10", "percent": 10})));
    }
}
