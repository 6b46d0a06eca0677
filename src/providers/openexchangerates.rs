use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::{RateKey, RateSource, RateTable, RequestType};

const PROVIDER_BASE: &str = "USD";
const RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
    description: Option<String>,
}

/// Rate tables from openexchangerates.org.
pub struct OpenExchangeRates {
    base_url: String,
    app_id: String,
    base: String,
    client: reqwest::Client,
}

impl OpenExchangeRates {
    pub fn new(base_url: &str, app_id: &str, base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xrates/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(OpenExchangeRates {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            base: base.to_string(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        let mut url = format!("{}/{}?app_id={}", self.base_url, endpoint, self.app_id);
        if self.base != PROVIDER_BASE {
            url.push_str("&base=");
            url.push_str(&self.base);
        }
        url
    }

    fn endpoint(request: RequestType, key: &RateKey) -> String {
        match request {
            RequestType::Historical => format!("historical/{key}.json"),
            RequestType::Latest => "latest.json".to_string(),
        }
    }

    async fn get_json(&self, endpoint: &str, what: &str) -> Result<String> {
        let url = self.url(endpoint);
        debug!("Requesting {} from {}", what, endpoint);

        let response = with_retry(|| self.client.get(&url).send(), RETRIES, RETRY_DELAY)
            .await
            .map_err(|e| anyhow!("Request error: {} for {}", e.without_url(), what))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ProviderError>(&text)
                .ok()
                .and_then(|err| err.description.or(err.message))
                .unwrap_or_default();
            return Err(anyhow!("HTTP error: {} for {}: {}", status, what, detail));
        }
        Ok(text)
    }

    /// Currency codes known to the provider, mapped to their display names.
    pub async fn fetch_currencies(&self) -> Result<BTreeMap<String, String>> {
        let text = self.get_json("currencies.json", "currencies").await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for currencies: {}", e))
    }
}

#[async_trait]
impl RateSource for OpenExchangeRates {
    #[instrument(name = "OxrFetch", skip(self), fields(key = %key))]
    async fn fetch(&self, request: RequestType, key: &RateKey) -> Result<RateTable> {
        let what = format!("{request} rates {key}");
        let text = self
            .get_json(&Self::endpoint(request, key), &what)
            .await?;

        let table: RateTable = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", what, e))?;
        if table.rates.is_empty() {
            return Err(anyhow!("No rate data found for {}", what));
        }
        Ok(table)
    }
}
