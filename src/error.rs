use std::fmt;
use thiserror::Error;

/// Which endpoint a failed request was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Markets,
    CoinDetails,
    MarketChart,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resource::Markets => "markets",
            Resource::CoinDetails => "coin details",
            Resource::MarketChart => "market chart",
        };
        f.write_str(s)
    }
}

/// The single data error kind: a request did not produce usable data.
///
/// Display is the generic user-facing message. The cause is kept only for
/// logs; callers never branch on it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", generic_message(.resource))]
pub struct FetchError {
    pub resource: Resource,
    pub cause: String,
}

impl FetchError {
    pub fn new(resource: Resource, cause: impl Into<String>) -> Self {
        Self {
            resource,
            cause: cause.into(),
        }
    }
}

fn generic_message(resource: &Resource) -> &'static str {
    match resource {
        Resource::Markets => "Failed to fetch data",
        Resource::CoinDetails => "Failed to fetch coin details",
        Resource::MarketChart => "Failed to fetch market chart data",
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("dashboard task has stopped")]
pub struct DashboardClosed;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}
