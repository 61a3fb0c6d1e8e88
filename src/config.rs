use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 250;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    /// Sent as `x-cg-pro-api-key` when present.
    pub api_key: Option<String>,
    pub per_page: u32,
    pub refresh_interval: Duration,
    /// Extra attempts after the first failed one.
    pub retries: u32,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            per_page: DEFAULT_PER_PAGE,
            refresh_interval: Duration::from_secs(60),
            retries: 1,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("COINGECKO_API_KEY")
            .map(|k| sanitize(&k))
            .filter(|k| !k.is_empty());

        let base_url = lookup("COINGECKO_BASE_URL")
            .map(|u| sanitize(&u).trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.base_url);

        let per_page = parse_var(&lookup, "COINBOARD_PER_PAGE")?
            .unwrap_or(u64::from(defaults.per_page));
        let per_page = validate_per_page(per_page)?;

        let refresh_secs = parse_var(&lookup, "COINBOARD_REFRESH_SECS")?
            .unwrap_or(defaults.refresh_interval.as_secs());
        if refresh_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "COINBOARD_REFRESH_SECS",
                value: "0".to_string(),
            });
        }

        let retries = parse_var(&lookup, "COINBOARD_RETRIES")?
            .map(|r| {
                u32::try_from(r).map_err(|_| ConfigError::InvalidValue {
                    name: "COINBOARD_RETRIES",
                    value: r.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(defaults.retries);

        let timeout_secs = parse_var(&lookup, "COINBOARD_TIMEOUT_SECS")?
            .unwrap_or(defaults.timeout.as_secs());

        Ok(Self {
            base_url,
            api_key,
            per_page,
            refresh_interval: Duration::from_secs(refresh_secs),
            retries,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }
}

pub fn validate_per_page(value: u64) -> Result<u32, ConfigError> {
    if value == 0 || value > u64::from(MAX_PER_PAGE) {
        return Err(ConfigError::OutOfRange {
            name: "per_page",
            value,
            min: 1,
            max: u64::from(MAX_PER_PAGE),
        });
    }
    Ok(value as u32)
}

fn parse_var<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => {
            let raw = sanitize(&raw);
            raw.parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue { name, value: raw })
        }
    }
}

// Strips whitespace and one level of surrounding quotes, as .env files often carry them.
fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unquoted.to_string()
}
