use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{FactSource, ProviderError};

pub const FACTS_URL: &str = "https://api.api-ninjas.com/v1/facts";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct FactsClient {
    http_client: reqwest::Client,
    api_key: String,
    url: String,
}

impl FactsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            url: FACTS_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FactEntry {
    fact: String,
}

fn first_fact(entries: Vec<FactEntry>) -> Option<String> {
    entries
        .into_iter()
        .map(|entry| entry.fact)
        .find(|fact| !fact.trim().is_empty())
}

#[async_trait]
impl FactSource for FactsClient {
    async fn random_fact(&self) -> Result<Option<String>, ProviderError> {
        let response = self
            .http_client
            .get(&self.url)
            .header("X-Api-Key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                endpoint: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                endpoint: self.url.clone(),
                status: response.status(),
            });
        }

        let entries: Vec<FactEntry> = response
            .json()
            .await
            .map_err(|source| ProviderError::Decode {
                endpoint: self.url.clone(),
                source,
            })?;
        Ok(first_fact(entries))
    }
}
