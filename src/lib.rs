pub mod chart;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod fetch;
pub mod format;
pub mod loader;
pub mod model;
pub mod sort;
pub mod view;

pub use config::Config;
pub use dashboard::{Command, Dashboard, DashboardHandle};
pub use error::{FetchError, Resource};
pub use export::{generate_filename, save_to_csv};
pub use fetch::{CoinGeckoClient, MarketApi};
pub use loader::{PageOutcome, PageRequest, TableLoader, TableSnapshot};
pub use model::{Coin, CoinDetail, MarketChart, PricePoint};
pub use sort::{Column, SortDirection, SortOrder, SortState};
