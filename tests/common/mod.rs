#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use coinboard::error::{FetchError, Resource};
use coinboard::model::{Coin, CoinDetail, MarketChart};
use coinboard::{MarketApi, SortOrder};

/// In-memory market of `total` coins, ranked by id number.
pub struct FakeMarket {
    total: usize,
    calls: Mutex<Vec<(u32, u32, SortOrder)>>,
    fail_pages: Mutex<Vec<u32>>,
    price_bump: Mutex<f64>,
}

impl FakeMarket {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            calls: Mutex::new(Vec::new()),
            fail_pages: Mutex::new(Vec::new()),
            price_bump: Mutex::new(0.0),
        }
    }

    /// Next request for `page` fails once.
    pub fn fail_page(&self, page: u32) {
        self.fail_pages.lock().unwrap().push(page);
    }

    pub fn bump_prices(&self, by: f64) {
        *self.price_bump.lock().unwrap() += by;
    }

    pub fn calls(&self) -> Vec<(u32, u32, SortOrder)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn coin(index: usize, price: f64) -> Coin {
    Coin {
        id: format!("coin-{index:04}"),
        name: format!("Coin {index}"),
        symbol: format!("c{index}"),
        image: String::new(),
        current_price: Some(price),
        market_cap: Some(1e9 / (index as f64 + 1.0)),
        market_cap_rank: Some(index as u32 + 1),
        total_volume: Some(1e6),
        price_change_percentage_1h_in_currency: None,
        price_change_percentage_24h_in_currency: Some(1.0),
        price_change_percentage_7d_in_currency: None,
        sparkline_in_7d: None,
    }
}

#[async_trait]
impl MarketApi for FakeMarket {
    async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        order: SortOrder,
    ) -> Result<Vec<Coin>, FetchError> {
        self.calls.lock().unwrap().push((page, per_page, order));
        {
            let mut fail = self.fail_pages.lock().unwrap();
            if let Some(pos) = fail.iter().position(|&p| p == page) {
                fail.remove(pos);
                return Err(FetchError::new(Resource::Markets, "HTTP 503"));
            }
        }

        let bump = *self.price_bump.lock().unwrap();
        let mut indices: Vec<usize> = (0..self.total).collect();
        if matches!(order, SortOrder::MarketCapAsc | SortOrder::IdDesc) {
            indices.reverse();
        }
        let start = (page as usize - 1) * per_page as usize;
        Ok(indices
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .map(|i| coin(i, 100.0 + i as f64 + bump))
            .collect())
    }

    async fn fetch_coin_details(&self, _id: &str) -> Result<CoinDetail, FetchError> {
        Err(FetchError::new(Resource::CoinDetails, "not faked"))
    }

    async fn fetch_market_chart(&self, _id: &str, _days: &str) -> Result<MarketChart, FetchError> {
        Ok(MarketChart::default())
    }
}
