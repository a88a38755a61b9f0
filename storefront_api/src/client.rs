//! HTTP client for the storefront backend API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    body::read_body,
    errors::ApiError,
    options::{Credentials, RequestBody, RequestOptions},
    Error,
};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Outcome of [`Client::execute`].
#[derive(Debug)]
pub enum Reply {
    /// The untouched response, returned when `raw` was requested.
    Raw(Response),
    /// The parsed payload of a successful response. May be `Value::Null`.
    Data(Value),
}

/// HTTP client for the storefront backend API.
///
/// Every call is independent: one request, no retries, no caching. Cookies
/// live in a shared jar so the backend's session cookie is replayed on later
/// calls, subject to each request's [`Credentials`] policy.
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL that relative paths resolve against.
    base_api_url: String,
    /// Transport that reads and writes the cookie jar.
    http: reqwest::Client,
    /// Transport with no cookie store, used for `Credentials::Omit`.
    http_anonymous: reqwest::Client,
    cookie_jar: Arc<Jar>,
    timeout: Option<Duration>,
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
    cookie_jar: Option<Arc<Jar>>,
}

impl ClientBuilder {
    /// Opt-in transport-wide timeout. Without one, requests wait as long as
    /// the transport does. Individual requests may set their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Shares an existing cookie jar, e.g. one seeded with a session cookie.
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let cookie_jar = self.cookie_jar.unwrap_or_default();
        let mut http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&cookie_jar));
        let mut http_anonymous = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
            http_anonymous = http_anonymous.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e)
            })?;
        let http_anonymous = http_anonymous
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e)
            })?;
        Ok(Client {
            base_api_url: self.base_url,
            timeout: self.timeout,
            http,
            http_anonymous,
            cookie_jar,
        })
    }
}

impl Client {
    /// Creates a client pointing at [`DEFAULT_BASE_URL`].
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.to_string(),
            timeout: None,
            cookie_jar: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    /// Transport-wide timeout, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The jar backing `Credentials::Include` requests.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookie_jar
    }

    /// Performs one request. Honors `opts.raw`: raw requests return the live
    /// response, anything else returns the parsed success payload or an
    /// [`Error::Api`] for non-2xx statuses.
    pub async fn execute(&self, path: &str, opts: RequestOptions) -> Result<Reply, Error> {
        let raw = opts.raw;
        let (resp, url) = self.dispatch(path, opts).await?;
        if raw {
            return Ok(Reply::Raw(resp));
        }
        interpret(resp, &url).await.map(Reply::Data)
    }

    /// Performs one request and decodes the success payload into `T`.
    ///
    /// Rejects `opts.raw`; use [`Client::raw`] or [`Client::execute`] for the
    /// live response. With `T = serde_json::Value` the success path never
    /// fails, whatever the body looks like.
    pub async fn request<T>(&self, path: &str, opts: RequestOptions) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        if opts.raw {
            return Err(Error::InvalidOption(
                "raw responses are only available through Client::raw or Client::execute",
            ));
        }
        let (resp, url) = self.dispatch(path, opts).await?;
        let value = interpret(resp, &url).await?;
        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Failed to decode payload from {}: {}", url, e);
            Error::Decode(e)
        })
    }

    /// Performs one request and returns the live response, whatever its status.
    /// The body is left unread.
    pub async fn raw(&self, path: &str, opts: RequestOptions) -> Result<Response, Error> {
        self.dispatch(path, opts).await.map(|(resp, _)| resp)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, opts: RequestOptions) -> Result<T, Error> {
        self.request(path, opts.method("GET")).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        opts: RequestOptions,
    ) -> Result<T, Error> {
        self.request(path, opts.method("POST").body(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        opts: RequestOptions,
    ) -> Result<T, Error> {
        self.request(path, opts.method("PUT").body(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        opts: RequestOptions,
    ) -> Result<T, Error> {
        self.request(path, opts.method("PATCH").body(body)).await
    }

    /// `DELETE` (named `del` since `delete` reads like a destructor).
    pub async fn del<T: DeserializeOwned>(&self, path: &str, opts: RequestOptions) -> Result<T, Error> {
        self.request(path, opts.method("DELETE")).await
    }

    /// Builds and sends the request, returning the response and the resolved URL.
    async fn dispatch(&self, path: &str, opts: RequestOptions) -> Result<(Response, String), Error> {
        let method = opts.resolved_method()?;
        let RequestOptions {
            headers: caller_headers,
            body,
            base_url,
            skip_content_type,
            credentials,
            timeout,
            query,
            invalid_header,
            ..
        } = opts;

        if let Some(name) = invalid_header {
            return Err(Error::InvalidHeader(name));
        }

        let base = base_url.as_deref().unwrap_or(&self.base_api_url);
        let resolved = resolve_url(base, path);
        let mut url = Url::parse(&resolved).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl {
                url: resolved.clone(),
                source: e,
            }
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let send_cookies = match credentials.unwrap_or_default() {
            Credentials::Include => true,
            Credentials::Omit => false,
            Credentials::SameOrigin => Url::parse(base)
                .map(|b| b.origin() == url.origin())
                .unwrap_or(false),
        };
        let transport = if send_cookies {
            &self.http
        } else {
            &self.http_anonymous
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.extend(caller_headers);
        let caller_set_content_type = headers.contains_key(CONTENT_TYPE);
        if !caller_set_content_type
            && body
                .as_ref()
                .is_some_and(|b| b.wants_json_content_type(skip_content_type))
        {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        // Diagnostics report the URL as resolved, not as re-serialized by `Url`.
        let url_string = if query.is_empty() {
            resolved
        } else {
            let separator = if resolved.contains('?') { '&' } else { '?' };
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&query)
                .finish();
            format!("{}{}{}", resolved, separator, encoded)
        };
        tracing::debug!("{} {}", method, url_string);

        let mut builder = transport.request(method, url);
        builder = match body {
            None => builder,
            Some(RequestBody::Json(value)) => {
                builder.body(serde_json::to_vec(&value).map_err(Error::Serialize)?)
            }
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes),
            Some(RequestBody::Form(pairs)) => {
                if !caller_set_content_type {
                    headers.insert(
                        CONTENT_TYPE,
                        HeaderValue::from_static("application/x-www-form-urlencoded"),
                    );
                }
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&pairs)
                    .finish();
                builder.body(encoded)
            }
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
        };
        builder = builder.headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", url_string, e);
            Error::Transport(e)
        })?;
        Ok((resp, url_string))
    }
}

/// Reads the body and splits success from failure.
async fn interpret(resp: Response, url: &str) -> Result<Value, Error> {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = read_body(resp).await;

    if status.is_success() {
        return Ok(body.data.into_value());
    }

    let err = ApiError::from_response_parts(status.as_u16(), &headers, &body, url);
    tracing::error!(
        "Request to {} failed with status {}: {}",
        url,
        err.status,
        err.message
    );
    Err(Error::Api(err))
}

/// Joins `base` and `path` with exactly one slash. Absolute `http(s)://`
/// paths are returned unchanged.
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base, path)
}
