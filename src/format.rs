//! en-US style number rendering for the terminal views.

use chrono::{DateTime, Utc};

pub const PLACEHOLDER: &str = "-";
pub const NOT_AVAILABLE: &str = "N/A";

pub const ARROW_UP: &str = "▲";
pub const ARROW_DOWN: &str = "▼";

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fixed decimals with comma grouping, sign dropped.
fn grouped_abs(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    match fixed.split_once('.') {
        Some((int, frac)) => format!("{}.{}", group_thousands(int), frac),
        None => group_thousands(&fixed),
    }
}

fn trim_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn with_sign(value: f64, body: String) -> String {
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{body}")
    } else {
        body
    }
}

/// `$1,234.57`, or four decimals below one dollar: `$0.1234`.
pub fn format_currency(value: f64) -> String {
    let decimals = if value.abs() < 1.0 { 4 } else { 2 };
    with_sign(value, format!("${}", grouped_abs(value, decimals)))
}

pub fn format_currency_opt(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format_currency)
}

/// Short form for large figures: `$31.26B`.
pub fn format_compact(value: f64) -> String {
    const SCALES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let abs = value.abs();
    let body = SCALES
        .iter()
        .find(|(scale, _)| abs >= *scale)
        .map(|(scale, suffix)| format!("{}{}", trim_zeros(format!("{:.2}", abs / scale)), suffix))
        .unwrap_or_else(|| trim_zeros(format!("{abs:.2}")));
    with_sign(value, format!("${body}"))
}

pub fn format_compact_opt(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format_compact)
}

/// Price with precision that follows magnitude.
pub fn format_price(price: f64) -> String {
    let body = if price > 1000.0 {
        trim_zeros(grouped_abs(price, 2))
    } else if price > 1.0 {
        format!("{:.2}", price.abs())
    } else {
        format!("{:.6}", price.abs())
    };
    with_sign(price, format!("${body}"))
}

/// `▲1.23%`, `▼0.40%`, or a dash when the API has no figure.
pub fn format_change(pct: Option<f64>) -> String {
    match pct {
        None => PLACEHOLDER.to_string(),
        Some(p) if p > 0.0 => format!("{ARROW_UP}{p:.2}%"),
        Some(p) if p < 0.0 => format!("{ARROW_DOWN}{:.2}%", p.abs()),
        Some(_) => "0.00%".to_string(),
    }
}

/// Coin amount with more decimals the smaller it is, then the ticker.
pub fn format_crypto_amount(value: f64, symbol: &str) -> String {
    let abs = value.abs();
    let decimals = if abs < 0.001 {
        8
    } else if abs < 1.0 {
        6
    } else {
        4
    };
    format!(
        "{} {}",
        with_sign(value, grouped_abs(value, decimals)),
        symbol.to_uppercase()
    )
}

/// Whole units with grouping, `N/A` when unknown.
pub fn format_supply(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| grouped_abs(v, 0))
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}
