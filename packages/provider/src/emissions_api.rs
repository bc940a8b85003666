//! HTTP client for the emissions API.
//!
//! See <https://api.v2.emissions-api.org/ui/> for the endpoint reference.
//! Every request carries the deadline from [`ProviderConfig::timeout`];
//! nothing is retried.

use async_trait::async_trait;
use travel_emissions_provider_models::{AverageQuery, Country, SparseSample};

use crate::{EmissionsProvider, ProviderConfig, ProviderError};

/// [`EmissionsProvider`] backed by the live emissions API.
#[derive(Debug, Clone)]
pub struct HttpEmissionsProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpEmissionsProvider {
    /// Creates a provider with its own pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Issues a GET request and decodes the body as JSON.
    ///
    /// A success status with a body that is not JSON is a
    /// [`ProviderError::Payload`], not a transport failure.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let url = format!("{}/{path}", self.config.base_url);
        log::debug!("GET {url} {query:?}");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let url = resp.url().to_string();
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Payload {
            message: format!("response from {url} is not JSON: {e}"),
        })
    }
}

#[async_trait]
impl EmissionsProvider for HttpEmissionsProvider {
    async fn products(&self) -> Result<serde_json::Value, ProviderError> {
        self.get_json("products.json", &[]).await
    }

    async fn countries(&self) -> Result<Vec<Country>, ProviderError> {
        let body = self.get_json("countries.json", &[]).await?;
        parse_countries(&body)
    }

    async fn averages(&self, query: &AverageQuery) -> Result<Vec<SparseSample>, ProviderError> {
        let path = format!("{}/average.json", query.product);
        let body = self.get_json(&path, &query.query_pairs()).await?;
        let samples = parse_samples(body)?;
        log::debug!(
            "{} samples of {} for {} between {} and {}",
            samples.len(),
            query.product,
            query.location,
            query.begin,
            query.end,
        );
        Ok(samples)
    }
}

/// Parses the `countries.json` code-to-name map, keeping provider order.
fn parse_countries(body: &serde_json::Value) -> Result<Vec<Country>, ProviderError> {
    let map = body.as_object().ok_or_else(|| ProviderError::Payload {
        message: "countries response is not an object".to_string(),
    })?;

    map.iter()
        .map(|(code, name)| {
            let name = name.as_str().ok_or_else(|| ProviderError::Payload {
                message: format!("country '{code}' has a non-string name"),
            })?;
            Ok(Country {
                code: code.clone(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Parses the `average.json` array of `{start, average}` rows.
fn parse_samples(body: serde_json::Value) -> Result<Vec<SparseSample>, ProviderError> {
    if !body.is_array() {
        return Err(ProviderError::Payload {
            message: "average response is not an array".to_string(),
        });
    }

    serde_json::from_value(body).map_err(|e| ProviderError::Payload {
        message: format!("malformed average row: {e}"),
    })
}
