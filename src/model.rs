use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One row of `/coins/markets`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default)]
    pub sparkline_in_7d: Option<Sparkline>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

impl Coin {
    /// Recent price history, empty when the API sent none.
    pub fn sparkline(&self) -> &[f64] {
        self.sparkline_in_7d
            .as_ref()
            .map(|s| s.price.as_slice())
            .unwrap_or(&[])
    }
}

/// Flattened coin row for CSV output.
#[derive(Debug, Clone, Serialize)]
pub struct CoinRow {
    pub rank: Option<u32>,
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price_usd: Option<f64>,
    pub market_cap_usd: Option<f64>,
    pub volume_usd: Option<f64>,
    pub chg1h_pct: Option<f64>,
    pub chg24h_pct: Option<f64>,
    pub chg7d_pct: Option<f64>,
}

impl CoinRow {
    /// Column names in serialization order.
    pub const HEADERS: [&'static str; 10] = [
        "rank",
        "id",
        "name",
        "symbol",
        "price_usd",
        "market_cap_usd",
        "volume_usd",
        "chg1h_pct",
        "chg24h_pct",
        "chg7d_pct",
    ];
}

impl From<&Coin> for CoinRow {
    fn from(coin: &Coin) -> Self {
        Self {
            rank: coin.market_cap_rank,
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            price_usd: coin.current_price,
            market_cap_usd: coin.market_cap,
            volume_usd: coin.total_volume,
            chg1h_pct: coin.price_change_percentage_1h_in_currency,
            chg24h_pct: coin.price_change_percentage_24h_in_currency,
            chg7d_pct: coin.price_change_percentage_7d_in_currency,
        }
    }
}

/// `/coins/{id}` response, reduced to what the detail view shows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: CoinImage,
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub links: Links,
    pub market_data: MarketData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoinImage {
    #[serde(default)]
    pub large: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub homepage: Vec<String>,
    pub whitepaper: Option<String>,
    pub subreddit_url: Option<String>,
    pub twitter_screen_name: Option<String>,
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub repos_url: ReposUrl,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReposUrl {
    #[serde(default)]
    pub github: Vec<String>,
}

impl Links {
    pub fn homepage(&self) -> Option<&str> {
        first_non_empty(&self.homepage)
    }

    pub fn github(&self) -> Option<&str> {
        first_non_empty(&self.repos_url.github)
    }

    pub fn twitter_url(&self) -> Option<String> {
        self.twitter_screen_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("https://twitter.com/{s}"))
    }
}

// The API pads link lists with empty strings.
fn first_non_empty(list: &[String]) -> Option<&str> {
    list.iter().map(String::as_str).find(|s| !s.is_empty())
}

/// Per-currency value, keyed the way the API nests them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrencyValue {
    pub usd: Option<f64>,
    pub btc: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrencyDate {
    pub usd: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: CurrencyValue,
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: CurrencyValue,
    #[serde(default)]
    pub low_24h: CurrencyValue,
    #[serde(default)]
    pub high_24h: CurrencyValue,
    #[serde(default)]
    pub market_cap: CurrencyValue,
    #[serde(default)]
    pub fully_diluted_valuation: CurrencyValue,
    #[serde(default)]
    pub total_volume: CurrencyValue,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub ath: CurrencyValue,
    #[serde(default)]
    pub ath_change_percentage: CurrencyValue,
    #[serde(default)]
    pub ath_date: CurrencyDate,
    #[serde(default)]
    pub atl: CurrencyValue,
    #[serde(default)]
    pub atl_change_percentage: CurrencyValue,
    #[serde(default)]
    pub atl_date: CurrencyDate,
}

/// `/coins/{id}/market_chart` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl MarketChart {
    /// Converts the raw `[ms, price]` pairs, skipping unrepresentable timestamps.
    pub fn points(&self) -> Vec<PricePoint> {
        self.prices
            .iter()
            .filter_map(|&(ms, price)| {
                Utc.timestamp_millis_opt(ms as i64)
                    .single()
                    .map(|timestamp| PricePoint { timestamp, price })
            })
            .collect()
    }
}
