//! Environment-driven client configuration.
//!
//! The environment is read once, here, and the result is handed to
//! [`Client`] explicitly. Nothing in `storefront_api` touches env vars.

use std::time::Duration;

use storefront_api::{Client, DEFAULT_BASE_URL};

/// Primary variable holding the backend base URL.
pub const API_URL_VAR: &str = "NEXT_PUBLIC_API_URL";
/// Legacy alias checked when [`API_URL_VAR`] is unset.
pub const LEGACY_API_URL_VAR: &str = "NEXT_PUBLIC_API_BASE_URL";
/// Optional transport timeout in whole seconds. Unset means no timeout.
pub const TIMEOUT_VAR: &str = "STOREFRONT_TIMEOUT_SECS";

/// Settings used to build a [`Client`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Transport-wide timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ApiConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values
    /// count as unset; an unparseable timeout is ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = var(API_URL_VAR)
            .or_else(|| var(LEGACY_API_URL_VAR))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = var(TIMEOUT_VAR)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        tracing::debug!("Using API base URL {}", base_url);
        Self { base_url, timeout }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build_client(&self) -> Result<Client, storefront_api::Error> {
        let mut builder = Client::builder(&self.base_url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
