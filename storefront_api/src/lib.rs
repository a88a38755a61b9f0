//! Thin HTTP client for the storefront backend REST API.
//!
//! One call, one request: resolve the URL against a base, normalize the
//! request body and headers, read the response without ever failing on a
//! malformed body, and turn non-2xx responses into a structured [`ApiError`].

mod body;
mod client;
mod errors;
mod options;
pub use self::body::{read_body, Body, ReadBody};
pub use self::client::{resolve_url, Client, ClientBuilder, Reply, DEFAULT_BASE_URL};
pub use self::errors::{ApiError, Error};
pub use self::options::{Credentials, RequestBody, RequestOptions};
pub use reqwest::cookie::Jar;
pub use reqwest::multipart;
