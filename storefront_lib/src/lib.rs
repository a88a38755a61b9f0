//! Composition layer for the storefront API client.
//!
//! Reads the backend base URL from the environment once and maps client
//! errors to messages fit for shoppers and admins.

pub mod config;
pub mod error;

pub use storefront_api;
pub use storefront_api::{
    ApiError, Client, Credentials, Error, Reply, RequestBody, RequestOptions,
};

pub use config::ApiConfig;
pub use error::{handle_api_error, ErrorKind};
