use crate::models::{PriceRecord, TaggedBar};
use crate::{Error, Result};
use chrono::DateTime;

/// Project tagged bars into the canonical record shape. Coercion failure
/// for any row fails the whole call so the cycle persists nothing partial.
pub fn normalize(bars: &[TaggedBar]) -> Result<Vec<PriceRecord>> {
    let mut records = Vec::with_capacity(bars.len());
    for tagged in bars {
        records.push(normalize_one(tagged)?);
    }
    Ok(records)
}

fn normalize_one(tagged: &TaggedBar) -> Result<PriceRecord> {
    let bar = &tagged.bar;
    let timestamp = DateTime::from_timestamp(bar.ts, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            Error::new(format!(
                "invalid timestamp {} for {}",
                bar.ts, tagged.symbol
            ))
        })?;

    Ok(PriceRecord {
        timestamp,
        symbol: tagged.symbol.clone(),
        open: coerce_price(bar.open, "open", &tagged.symbol)?,
        high: coerce_price(bar.high, "high", &tagged.symbol)?,
        low: coerce_price(bar.low, "low", &tagged.symbol)?,
        close: coerce_price(bar.close, "close", &tagged.symbol)?,
        volume: bar.volume.ok_or_else(|| {
            Error::new(format!("missing volume for {}", tagged.symbol))
        })?,
    })
}

fn coerce_price(value: Option<f64>, field: &str, symbol: &str) -> Result<f64> {
    match value {
        Some(value) if value.is_finite() => Ok(value),
        Some(_) => Err(Error::new(format!(
            "non-finite {field} for {symbol}"
        ))),
        None => Err(Error::new(format!("missing {field} for {symbol}"))),
    }
}
