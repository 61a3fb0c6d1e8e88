//! Column sorting, expressed as the API's `order` parameter.
//!
//! Rows are never re-sorted locally; a sort change only picks a different
//! token and the loader refetches from page 1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Rank,
    Coin,
    Price,
    Change1h,
    Change24h,
    Change7d,
    Volume,
    MarketCap,
    Sparkline,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Rank,
        Column::Coin,
        Column::Price,
        Column::Change1h,
        Column::Change24h,
        Column::Change7d,
        Column::Volume,
        Column::MarketCap,
        Column::Sparkline,
    ];

    pub fn is_sortable(self) -> bool {
        self.tokens().is_some()
    }

    /// (ascending, descending) tokens for sortable columns.
    fn tokens(self) -> Option<(SortOrder, SortOrder)> {
        match self {
            // Rank 1 is the largest market cap, so rank order runs opposite to cap order.
            Column::Rank => Some((SortOrder::MarketCapDesc, SortOrder::MarketCapAsc)),
            Column::Coin => Some((SortOrder::IdAsc, SortOrder::IdDesc)),
            Column::Volume => Some((SortOrder::VolumeAsc, SortOrder::VolumeDesc)),
            Column::MarketCap => Some((SortOrder::MarketCapAsc, SortOrder::MarketCapDesc)),
            Column::Price
            | Column::Change1h
            | Column::Change24h
            | Column::Change7d
            | Column::Sparkline => None,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Rank => "#",
            Column::Coin => "Coin",
            Column::Price => "Price",
            Column::Change1h => "1h",
            Column::Change24h => "24h",
            Column::Change7d => "7d",
            Column::Volume => "24h Volume",
            Column::MarketCap => "Market Cap",
            Column::Sparkline => "Last 7 Days",
        }
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "#" | "rank" => Ok(Column::Rank),
            "coin" | "name" | "id" => Ok(Column::Coin),
            "price" => Ok(Column::Price),
            "1h" => Ok(Column::Change1h),
            "24h" => Ok(Column::Change24h),
            "7d" => Ok(Column::Change7d),
            "volume" | "vol" => Ok(Column::Volume),
            "market_cap" | "marketcap" | "mcap" | "cap" => Ok(Column::MarketCap),
            "sparkline" | "chart" => Ok(Column::Sparkline),
            other => Err(format!("unknown column: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Values accepted by the `order` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    MarketCapDesc,
    MarketCapAsc,
    VolumeDesc,
    VolumeAsc,
    IdDesc,
    IdAsc,
    GeckoDesc,
    GeckoAsc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::MarketCapDesc => "market_cap_desc",
            SortOrder::MarketCapAsc => "market_cap_asc",
            SortOrder::VolumeDesc => "volume_desc",
            SortOrder::VolumeAsc => "volume_asc",
            SortOrder::IdDesc => "id_desc",
            SortOrder::IdAsc => "id_asc",
            SortOrder::GeckoDesc => "gecko_desc",
            SortOrder::GeckoAsc => "gecko_asc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: Column::MarketCap,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Token for a column and direction, `None` when the column is not sortable.
    pub fn token_for(column: Column, direction: SortDirection) -> Option<SortOrder> {
        column.tokens().map(|(asc, desc)| match direction {
            SortDirection::Asc => asc,
            SortDirection::Desc => desc,
        })
    }

    pub fn order(&self) -> SortOrder {
        Self::token_for(self.column, self.direction).unwrap_or_default()
    }

    /// Applies a header click. Returns false, leaving the state untouched,
    /// for columns outside the allow-list.
    pub fn select(&mut self, column: Column) -> bool {
        if !column.is_sortable() {
            return false;
        }
        if column == self.column {
            self.direction = self.direction.toggled();
        } else {
            self.column = column;
            self.direction = SortDirection::Asc;
        }
        true
    }
}
