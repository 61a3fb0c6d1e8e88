//! Plain-text rendering of the table and the coin detail view.

use std::fmt::Write;

use crate::chart::{sparkline, ChartSummary};
use crate::convert::Converter;
use crate::format::{
    format_change, format_compact_opt, format_crypto_amount, format_currency,
    format_currency_opt, format_date, format_price, format_supply, NOT_AVAILABLE, PLACEHOLDER,
};
use crate::loader::TableSnapshot;
use crate::model::{Coin, CoinDetail};
use crate::sort::{Column, SortState};

const SPARKLINE_WIDTH: usize = 16;
const NAME_WIDTH: usize = 24;

fn header_cell(column: Column, sort: &SortState) -> String {
    if column == sort.column {
        format!("{}{}", column.header(), sort.direction.arrow())
    } else {
        column.header().to_string()
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}

pub fn render_row(coin: &Coin) -> String {
    let name = format!("{} {}", coin.name, coin.symbol.to_uppercase());
    let spark = match coin.sparkline() {
        [] => "Data unavailable".to_string(),
        prices => sparkline(prices, SPARKLINE_WIDTH),
    };
    format!(
        "{:<5} {:<24} {:>14} {:>9} {:>9} {:>9} {:>12} {:>12}  {}",
        coin.market_cap_rank
            .map_or_else(|| PLACEHOLDER.to_string(), |r| r.to_string()),
        truncate(&name, NAME_WIDTH),
        format_currency_opt(coin.current_price),
        format_change(coin.price_change_percentage_1h_in_currency),
        format_change(coin.price_change_percentage_24h_in_currency),
        format_change(coin.price_change_percentage_7d_in_currency),
        format_compact_opt(coin.total_volume),
        format_compact_opt(coin.market_cap),
        spark,
    )
}

pub fn render_table(snapshot: &TableSnapshot) -> String {
    let sort = &snapshot.sort;
    let mut out = String::new();
    let _ = writeln!(out, "Cryptocurrency Prices by Market Cap");
    let _ = writeln!(
        out,
        "{:<5} {:<24} {:>14} {:>9} {:>9} {:>9} {:>12} {:>12}  {}",
        header_cell(Column::Rank, sort),
        header_cell(Column::Coin, sort),
        header_cell(Column::Price, sort),
        header_cell(Column::Change1h, sort),
        header_cell(Column::Change24h, sort),
        header_cell(Column::Change7d, sort),
        header_cell(Column::Volume, sort),
        header_cell(Column::MarketCap, sort),
        header_cell(Column::Sparkline, sort),
    );
    let _ = writeln!(out, "{}", "-".repeat(120));
    for coin in &snapshot.rows {
        let _ = writeln!(out, "{}", render_row(coin));
    }
    let _ = writeln!(out, "{}", status_line(snapshot));
    out
}

pub fn status_line(snapshot: &TableSnapshot) -> String {
    let mut parts = vec![format!(
        "{} coins, {} page(s), order {}",
        snapshot.rows.len(),
        snapshot.pages_loaded,
        snapshot.sort.order()
    )];
    if snapshot.loading {
        parts.push("loading…".to_string());
    } else if !snapshot.has_more {
        parts.push("end of list".to_string());
    }
    if let Some(err) = &snapshot.error {
        parts.push(format!("error: {err}"));
    }
    if let Some(at) = snapshot.updated_at {
        parts.push(format!("updated {}", at.format("%H:%M:%S UTC")));
    }
    parts.join(" | ")
}

fn line(out: &mut String, label: &str, value: impl AsRef<str>) {
    let _ = writeln!(out, "  {:<26} {}", label, value.as_ref());
}

pub fn render_detail(
    detail: &CoinDetail,
    chart: Option<&ChartSummary>,
    converter: &Converter,
) -> String {
    let md = &detail.market_data;
    let symbol = detail.symbol.to_uppercase();
    let mut out = String::new();

    let rank = detail
        .market_cap_rank
        .map_or_else(|| PLACEHOLDER.to_string(), |r| format!("#{r}"));
    let _ = writeln!(out, "{} ({symbol}) {rank}", detail.name);
    let _ = writeln!(
        out,
        "  {}  {}",
        format_currency_opt(md.current_price.usd),
        format_change(md.price_change_percentage_24h)
    );
    if let Some(btc) = md.current_price.btc {
        let _ = writeln!(
            out,
            "  {btc:.5} BTC  {}",
            format_change(md.price_change_percentage_24h_in_currency.btc)
        );
    }

    if let (Some(price), Some(low), Some(high)) =
        (md.current_price.usd, md.low_24h.usd, md.high_24h.usd)
    {
        let pct = crate::chart::range_progress(price, low, high);
        let _ = writeln!(
            out,
            "  24h Range {} - {} ({pct:.0}%)",
            format_currency(low),
            format_currency(high)
        );
    }

    let _ = writeln!(out);
    line(&mut out, "Market Cap", format_currency_opt(md.market_cap.usd));
    line(
        &mut out,
        "Fully Diluted Valuation",
        md.fully_diluted_valuation
            .usd
            .map_or_else(|| NOT_AVAILABLE.to_string(), format_currency),
    );
    line(&mut out, "24 Hour Trading Vol", format_currency_opt(md.total_volume.usd));
    line(&mut out, "Circulating Supply", format_supply(md.circulating_supply));
    line(&mut out, "Total Supply", format_supply(md.total_supply));
    line(&mut out, "Max Supply", format_supply(md.max_supply));

    if let Some(ath) = md.ath.usd {
        let change = md
            .ath_change_percentage
            .usd
            .map_or_else(String::new, |c| format!(" ({c:.1}%)"));
        let date = md.ath_date.usd.as_ref().map_or_else(String::new, |d| format!(" {}", format_date(d)));
        line(&mut out, "All-Time High", format!("{}{change}{date}", format_currency(ath)));
    }
    if let Some(atl) = md.atl.usd {
        let change = md
            .atl_change_percentage
            .usd
            .map_or_else(String::new, |c| format!(" (+{:.1}%)", c.abs()));
        let date = md.atl_date.usd.as_ref().map_or_else(String::new, |d| format!(" {}", format_date(d)));
        line(&mut out, "All-Time Low", format!("{}{change}{date}", format_currency(atl)));
    }

    let links = &detail.links;
    let mut info = Vec::new();
    if let Some(home) = links.homepage() {
        info.push(("Website", home.to_string()));
    }
    if let Some(paper) = links.whitepaper.as_deref().filter(|s| !s.is_empty()) {
        info.push(("Whitepaper", paper.to_string()));
    }
    if let Some(reddit) = links.subreddit_url.as_deref().filter(|s| !s.is_empty()) {
        info.push(("Reddit", reddit.to_string()));
    }
    if let Some(twitter) = links.twitter_url() {
        info.push(("Twitter", twitter));
    }
    if let Some(facebook) = links.facebook_url.as_deref().filter(|s| !s.is_empty()) {
        info.push(("Facebook", facebook.to_string()));
    }
    if let Some(github) = links.github() {
        info.push(("Source Code", github.to_string()));
    }
    if !info.is_empty() {
        let _ = writeln!(out, "\nInfo");
        for (label, url) in info {
            line(&mut out, label, url);
        }
    }

    if let Some(chart) = chart {
        let _ = writeln!(out, "\n{symbol} Price Chart ({})", chart.period);
        if chart.points == 0 {
            let _ = writeln!(out, "  no data");
        } else {
            let trend = if chart.increasing { "up" } else { "down" };
            let change = chart
                .change_pct()
                .map_or_else(String::new, |c| format!(" {c:+.2}%"));
            line(&mut out, "Points", chart.points.to_string());
            line(
                &mut out,
                "Range",
                format!("{} - {}", format_price(chart.low), format_price(chart.high)),
            );
            line(&mut out, "Trend", format!("{trend}{change}"));
            let ticks: Vec<String> = chart.ticks.iter().map(|t| format_price(*t)).collect();
            line(&mut out, "Axis", ticks.join("  "));
            if let (Some(first), Some(last)) = (chart.first, chart.last) {
                let fmt = chart.period.date_format();
                line(
                    &mut out,
                    "Span",
                    format!("{} → {}", first.timestamp.format(fmt), last.timestamp.format(fmt)),
                );
            }
        }
    }

    let _ = writeln!(out, "\n{symbol} Converter");
    line(
        &mut out,
        converter.symbol(),
        format_crypto_amount(converter.crypto(), converter.symbol()),
    );
    line(&mut out, "USD", format_currency(converter.usd()));
    out
}
