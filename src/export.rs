use anyhow::Result;
use chrono::Utc;
use csv::Writer;
use std::fs::OpenOptions;
use std::path::Path;

use crate::model::{Coin, CoinRow};

/// Writes the loaded rows, in table order, with a header line.
pub fn save_to_csv<P: AsRef<Path>>(coins: &[Coin], file_path: P) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(file_path)?;

    let mut wtr = Writer::from_writer(file);

    // serde only emits the header alongside the first row
    if coins.is_empty() {
        wtr.write_record(CoinRow::HEADERS)?;
    }

    for coin in coins {
        wtr.serialize(CoinRow::from(coin))?;
    }

    wtr.flush()?;
    Ok(coins.len())
}

pub fn generate_filename() -> String {
    let now = Utc::now();
    format!("coinboard_{}.csv", now.format("%Y%m%d_%H%M%S"))
}
