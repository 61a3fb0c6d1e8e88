//! Historical price series helpers for the detail view.

use std::fmt;
use std::str::FromStr;

use crate::model::PricePoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePeriod {
    Day,
    #[default]
    Week,
    Month,
    Quarter,
    Year,
    Max,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 6] = [
        TimePeriod::Day,
        TimePeriod::Week,
        TimePeriod::Month,
        TimePeriod::Quarter,
        TimePeriod::Year,
        TimePeriod::Max,
    ];

    /// Value for the `days` query parameter.
    pub fn days(self) -> &'static str {
        match self {
            TimePeriod::Day => "1",
            TimePeriod::Week => "7",
            TimePeriod::Month => "30",
            TimePeriod::Quarter => "90",
            TimePeriod::Year => "365",
            TimePeriod::Max => "max",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimePeriod::Day => "24h",
            TimePeriod::Week => "7d",
            TimePeriod::Month => "1m",
            TimePeriod::Quarter => "3m",
            TimePeriod::Year => "1y",
            TimePeriod::Max => "max",
        }
    }

    /// strftime pattern for x-axis labels at this zoom level.
    pub fn date_format(self) -> &'static str {
        match self {
            TimePeriod::Day => "%H:%M",
            TimePeriod::Week | TimePeriod::Month => "%b %-d",
            TimePeriod::Quarter | TimePeriod::Year | TimePeriod::Max => "%b %-d, %Y",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        TimePeriod::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("unknown period: {s} (expected 24h, 7d, 1m, 3m, 1y or max)"))
    }
}

fn min_max(points: &[PricePoint]) -> Option<(f64, f64)> {
    let mut iter = points.iter().map(|p| p.price);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

/// Y range with 5% padding on both sides; `(0, 0)` for an empty series.
pub fn price_domain(points: &[PricePoint]) -> (f64, f64) {
    match min_max(points) {
        None => (0.0, 0.0),
        Some((min, max)) => {
            let padding = (max - min) * 0.05;
            (min - padding, max + padding)
        }
    }
}

/// Powers of ten when the series spans more than one order of magnitude,
/// otherwise five evenly spaced ticks from min to max.
pub fn y_axis_ticks(points: &[PricePoint]) -> Vec<f64> {
    let Some((min, max)) = min_max(points) else {
        return Vec::new();
    };

    if min > 0.0 && max / min > 10.0 {
        let lo = min.log10().floor() as i32;
        let hi = max.log10().ceil() as i32;
        return (lo..=hi).map(|e| 10f64.powi(e)).collect();
    }

    let step = (max - min) / 4.0;
    (0..5).map(|i| min + step * f64::from(i)).collect()
}

pub fn is_price_increasing(points: &[PricePoint]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => last.price > first.price,
        _ => false,
    }
}

/// Where `current` sits between `low` and `high`, in percent.
pub fn range_progress(current: f64, low: f64, high: f64) -> f64 {
    if high == low {
        return 50.0;
    }
    (current - low) / (high - low) * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    pub period: TimePeriod,
    pub points: usize,
    pub first: Option<PricePoint>,
    pub last: Option<PricePoint>,
    pub low: f64,
    pub high: f64,
    pub domain: (f64, f64),
    pub ticks: Vec<f64>,
    pub increasing: bool,
}

impl ChartSummary {
    pub fn new(period: TimePeriod, points: &[PricePoint]) -> Self {
        let (low, high) = min_max(points).unwrap_or((0.0, 0.0));
        Self {
            period,
            points: points.len(),
            first: points.first().copied(),
            last: points.last().copied(),
            low,
            high,
            domain: price_domain(points),
            ticks: y_axis_ticks(points),
            increasing: is_price_increasing(points),
        }
    }

    /// Percent change from the first to the last point.
    pub fn change_pct(&self) -> Option<f64> {
        match (self.first, self.last) {
            (Some(first), Some(last)) if first.price != 0.0 => {
                Some((last.price - first.price) / first.price * 100.0)
            }
            _ => None,
        }
    }
}

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Unicode sparkline of at most `width` cells, downsampled by averaging.
pub fn sparkline(prices: &[f64], width: usize) -> String {
    if prices.is_empty() || width == 0 {
        return String::new();
    }
    let buckets = width.min(prices.len());
    let sampled: Vec<f64> = (0..buckets)
        .map(|b| {
            let start = b * prices.len() / buckets;
            let end = ((b + 1) * prices.len() / buckets).max(start + 1);
            let slice = &prices[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();

    let lo = sampled.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = sampled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    sampled
        .iter()
        .map(|&v| {
            if span <= 0.0 {
                BARS[BARS.len() / 2]
            } else {
                let idx = ((v - lo) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                price,
            })
            .collect()
    }

    #[test]
    fn periods_map_to_days() {
        let days: Vec<&str> = TimePeriod::ALL.iter().map(|p| p.days()).collect();
        assert_eq!(days, vec!["1", "7", "30", "90", "365", "max"]);
        assert_eq!("1Y".parse::<TimePeriod>(), Ok(TimePeriod::Year));
        assert_eq!(TimePeriod::default(), TimePeriod::Week);
        assert!("2w".parse::<TimePeriod>().is_err());
    }

    #[test]
    fn domain_pads_five_percent() {
        assert_eq!(price_domain(&[]), (0.0, 0.0));
        let (lo, hi) = price_domain(&series(&[100.0, 200.0, 150.0]));
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 205.0).abs() < 1e-9);
    }

    #[test]
    fn linear_ticks_for_narrow_range() {
        let ticks = y_axis_ticks(&series(&[100.0, 200.0]));
        assert_eq!(ticks, vec![100.0, 125.0, 150.0, 175.0, 200.0]);
        assert!(y_axis_ticks(&[]).is_empty());
    }

    #[test]
    fn log_ticks_for_wide_range() {
        let ticks = y_axis_ticks(&series(&[0.5, 3.0, 250.0]));
        assert_eq!(ticks, vec![0.1, 1.0, 10.0, 100.0, 1000.0]);
    }

    #[test]
    fn trend_needs_two_points() {
        assert!(!is_price_increasing(&series(&[5.0])));
        assert!(is_price_increasing(&series(&[5.0, 4.0, 6.0])));
        assert!(!is_price_increasing(&series(&[5.0, 9.0, 5.0])));
    }

    #[test]
    fn range_progress_midpoint_when_flat() {
        assert_eq!(range_progress(10.0, 10.0, 10.0), 50.0);
        assert_eq!(range_progress(75.0, 50.0, 100.0), 50.0);
        assert_eq!(range_progress(100.0, 50.0, 100.0), 100.0);
    }

    #[test]
    fn summary_change() {
        let summary = ChartSummary::new(TimePeriod::Day, &series(&[100.0, 90.0, 110.0]));
        assert_eq!(summary.points, 3);
        assert_eq!(summary.low, 90.0);
        assert_eq!(summary.high, 110.0);
        assert!(summary.increasing);
        assert!((summary.change_pct().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn sparkline_width_and_extremes() {
        let line = sparkline(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 4);
        assert_eq!(line.chars().count(), 4);
        assert!(line.starts_with('▁'));
        assert!(line.ends_with('█'));
        assert_eq!(sparkline(&[3.0, 3.0], 10), "▅▅");
        assert!(sparkline(&[], 10).is_empty());
    }
}
