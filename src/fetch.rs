use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, FetchError, Resource};
use crate::model::{Coin, CoinDetail, MarketChart};
use crate::sort::SortOrder;

pub const API_KEY_HEADER: &str = "x-cg-pro-api-key";
pub const VS_CURRENCY: &str = "usd";
pub const PRICE_CHANGE_WINDOWS: &str = "1h,24h,7d";

const RETRY_PAUSE: Duration = Duration::from_millis(500);

/// Read access to the market-data API.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// One page of ranked coins, 1-based `page`.
    async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        order: SortOrder,
    ) -> Result<Vec<Coin>, FetchError>;

    async fn fetch_coin_details(&self, id: &str) -> Result<CoinDetail, FetchError>;

    /// `days` is a number of days or `"max"`.
    async fn fetch_market_chart(&self, id: &str, days: &str) -> Result<MarketChart, FetchError>;
}

/// `hourly` for a one-day window, `daily` for everything else.
pub fn chart_interval(days: &str) -> &'static str {
    if days == "1" {
        "hourly"
    } else {
        "daily"
    }
}

pub fn markets_query(page: u32, per_page: u32, order: SortOrder) -> Vec<(&'static str, String)> {
    vec![
        ("vs_currency", VS_CURRENCY.to_string()),
        ("order", order.as_str().to_string()),
        ("per_page", per_page.to_string()),
        ("page", page.to_string()),
        ("sparkline", "true".to_string()),
        ("price_change_percentage", PRICE_CHANGE_WINDOWS.to_string()),
    ]
}

pub fn market_chart_query(days: &str) -> Vec<(&'static str, String)> {
    vec![
        ("vs_currency", VS_CURRENCY.to_string()),
        ("days", days.to_string()),
        ("interval", chart_interval(days).to_string()),
    ]
}

/// CoinGecko v3 over reqwest.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl CoinGeckoClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("coinboard/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidValue {
                name: "COINGECKO_API_KEY",
                value: "<redacted>".to_string(),
            })?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retries: config.retries,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: Resource,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;
        loop {
            match self.try_get(&url, query).await {
                Ok(body) => return Ok(body),
                Err(cause) if attempt < self.retries => {
                    attempt += 1;
                    warn!(%resource, %url, attempt, error = %cause, "request failed, retrying");
                    sleep(RETRY_PAUSE).await;
                }
                Err(cause) => {
                    warn!(%resource, %url, error = %cause, "request failed");
                    return Err(FetchError::new(resource, cause.to_string()));
                }
            }
        }
    }

    async fn try_get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, reqwest::Error> {
        debug!(%url, ?query, "GET");
        self.client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
    }
}

#[async_trait]
impl MarketApi for CoinGeckoClient {
    async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        order: SortOrder,
    ) -> Result<Vec<Coin>, FetchError> {
        let query = markets_query(page, per_page, order);
        self.get_json(Resource::Markets, "/coins/markets", &query)
            .await
    }

    async fn fetch_coin_details(&self, id: &str) -> Result<CoinDetail, FetchError> {
        let path = format!("/coins/{id}");
        self.get_json(Resource::CoinDetails, &path, &[]).await
    }

    async fn fetch_market_chart(&self, id: &str, days: &str) -> Result<MarketChart, FetchError> {
        let path = format!("/coins/{id}/market_chart");
        let query = market_chart_query(days);
        self.get_json(Resource::MarketChart, &path, &query).await
    }
}
