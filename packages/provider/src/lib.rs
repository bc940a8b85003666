#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the upstream emissions data API.
//!
//! The provider exposes three read endpoints:
//!
//! 1. `GET /products.json`: the catalog of emission products.
//! 2. `GET /countries.json`: a map of country code to country name.
//! 3. `GET /{product}/average.json`: sparse daily averages for a country
//!    or a point over a date range.
//!
//! Callers depend on the [`EmissionsProvider`] trait so the aggregation
//! logic can run against the live API ([`emissions_api::HttpEmissionsProvider`])
//! or an in-memory stand-in.

pub mod emissions_api;

use std::time::Duration;

use async_trait::async_trait;
use travel_emissions_provider_models::{AverageQuery, Country, SparseSample};

pub use emissions_api::HttpEmissionsProvider;

/// Public instance of the emissions API.
pub const DEFAULT_BASE_URL: &str = "https://api.v2.emissions-api.org/api/v2";

/// Default deadline for a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from upstream provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network failure, timeout, or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Provider returned status {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response decoded as JSON but not in the expected shape.
    #[error("Unexpected provider payload: {message}")]
    Payload {
        /// Description of the mismatch.
        message: String,
    },
}

/// Connection settings for the upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API root without a trailing slash (e.g. [`DEFAULT_BASE_URL`]).
    pub base_url: String,
    /// Deadline applied to every outbound request.
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Reads `EMISSIONS_API_URL` and `EMISSIONS_API_TIMEOUT_SECS`, falling
    /// back to the defaults for unset or unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("EMISSIONS_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| url.trim().to_string());

        let timeout = std::env::var("EMISSIONS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Self::new(base_url, timeout)
    }

    /// Creates a config, stripping any trailing slash from `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, timeout }
    }
}

/// Read access to an emissions data source.
#[async_trait]
pub trait EmissionsProvider: Send + Sync {
    /// Returns the product catalog exactly as the provider sends it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the request fails.
    async fn products(&self) -> Result<serde_json::Value, ProviderError>;

    /// Returns all countries in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the request fails or the response is
    /// not a code-to-name map.
    async fn countries(&self) -> Result<Vec<Country>, ProviderError>;

    /// Returns the sparse daily averages for a product, location and range.
    ///
    /// Samples come back in provider order, which is not guaranteed to be
    /// sorted or contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the request fails or a row is malformed.
    async fn averages(&self, query: &AverageQuery) -> Result<Vec<SparseSample>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_strips_trailing_slash() {
        let config = ProviderConfig::new("http://localhost:9000/api/v2/", Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:9000/api/v2");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn default_config_points_at_public_api() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
