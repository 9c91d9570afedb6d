use crate::broker::types::BrokerOrder;
use crate::config::Settings;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ORDERS_PATH: &str = "/v2/orders";
const DEFAULT_RETRIES: u32 = 3;

#[async_trait::async_trait]
pub trait BrokerClient: Send + Sync {
    fn broker_name(&self) -> &'static str;

    /// Most recent orders first, all statuses.
    async fn fetch_recent_orders(&self, limit: usize) -> Result<Vec<BrokerOrder>>;
}

#[derive(Debug, Clone)]
pub struct HttpBrokerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
    orders_path: String,
    retries: u32,
}

impl HttpBrokerClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_broker_api_base_url()?.to_string();

        let timeout_secs = std::env::var("BROKER_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("BROKER_API_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let orders_path = std::env::var("BROKER_API_ORDERS_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ORDERS_PATH.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build broker http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.broker_api_key.clone(),
            api_secret: settings.broker_api_secret.clone(),
            orders_path,
            retries,
        })
    }

    fn url(&self) -> String {
        let path = if self.orders_path.starts_with('/') {
            self.orders_path.clone()
        } else {
            format!("/{}", self.orders_path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            headers.insert("APCA-API-KEY-ID", HeaderValue::from_str(key)?);
        }
        if let Some(secret) = &self.api_secret {
            headers.insert("APCA-API-SECRET-KEY", HeaderValue::from_str(secret)?);
        }
        Ok(headers)
    }

    async fn fetch_once(&self, limit: usize) -> Result<Vec<BrokerOrder>> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[
                ("status", "all".to_string()),
                ("limit", limit.to_string()),
                ("direction", "desc".to_string()),
            ])
            .send()
            .await
            .context("broker orders request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read broker response")?;

        if !status.is_success() {
            anyhow::bail!("broker HTTP {status}: {text}");
        }

        let orders = serde_json::from_str::<Vec<BrokerOrder>>(&text)
            .with_context(|| format!("failed to parse broker orders response: {text}"))?;

        for order in &orders {
            anyhow::ensure!(
                !order.symbol.trim().is_empty(),
                "broker order {} has an empty symbol",
                order.id
            );
        }

        Ok(orders)
    }
}

#[async_trait::async_trait]
impl BrokerClient for HttpBrokerClient {
    fn broker_name(&self) -> &'static str {
        "alpaca_http"
    }

    async fn fetch_recent_orders(&self, limit: usize) -> Result<Vec<BrokerOrder>> {
        anyhow::ensure!(
            (1..=500).contains(&limit),
            "orders limit must be 1..=500 (got {limit})"
        );

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(limit).await {
                Ok(orders) => return Ok(orders),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "broker fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, path: Option<&str>) -> HttpBrokerClient {
        HttpBrokerClient {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: None,
            api_secret: None,
            orders_path: path.unwrap_or(DEFAULT_ORDERS_PATH).to_string(),
            retries: 1,
        }
    }

    #[test]
    fn url_joins_base_and_path() {
        let c = client("https://paper-api.alpaca.markets/", None);
        assert_eq!(c.url(), "https://paper-api.alpaca.markets/v2/orders");
    }

    #[test]
    fn url_normalizes_missing_leading_slash() {
        let c = client("https://paper-api.alpaca.markets", Some("v2/orders"));
        assert_eq!(c.url(), "https://paper-api.alpaca.markets/v2/orders");
    }
}
