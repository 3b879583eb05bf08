use crate::models::PriceRecord;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN: f64 = 48.0;

const UP_COLOR: &str = "#26a69a";
const DOWN_COLOR: &str = "#ef5350";
const WICK_COLOR: &str = "#7f8c8d";

/// Render the cycle's chart to the configured path. Advisory: the caller
/// logs a warning on failure and the cycle continues.
pub fn write_chart(path: &str, records: &[PriceRecord]) -> Result<()> {
    if records.is_empty() {
        warn!("no data available to render chart");
        return Ok(());
    }
    let svg = render_svg(records);
    ensure_parent_dir(path)?;
    fs::write(path, svg).map_err(|err| Error::new(format!("chart write failed: {err}")))?;
    info!(path = %path, "chart rendered");
    Ok(())
}

/// One candlestick series per distinct symbol, ordered by timestamp, on a
/// shared price axis. Up candle when close >= open.
pub fn render_svg(records: &[PriceRecord]) -> String {
    let slots = timestamp_slots(records);
    let (y_lower, y_upper) = price_bounds(records);

    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let slot_w = plot_w / slots.len() as f64;
    let body_w = (slot_w * 0.6).clamp(1.0, 12.0);

    let mut series: BTreeMap<&str, Vec<&PriceRecord>> = BTreeMap::new();
    for record in records {
        series.entry(record.symbol.as_str()).or_default().push(record);
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">\n"
    ));
    svg.push_str(&format!(
        "  <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#ffffff\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{MARGIN}\" y=\"{}\" font-size=\"12\" fill=\"#2c3e50\">{:.2}</text>\n",
        MARGIN - 6.0,
        y_upper
    ));
    svg.push_str(&format!(
        "  <text x=\"{MARGIN}\" y=\"{}\" font-size=\"12\" fill=\"#2c3e50\">{:.2}</text>\n",
        MARGIN + plot_h + 16.0,
        y_lower
    ));
    if let (Some(first), Some(last)) = (slots.first(), slots.last()) {
        svg.push_str(&format!(
            "  <text x=\"{MARGIN}\" y=\"{}\" font-size=\"12\" fill=\"#7f8c8d\">{}</text>\n",
            HEIGHT - 8.0,
            format_slot(first)
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#7f8c8d\" text-anchor=\"end\">{}</text>\n",
            MARGIN + plot_w,
            HEIGHT - 8.0,
            format_slot(last)
        ));
    }

    let mut legend_x = MARGIN;
    for symbol in series.keys() {
        svg.push_str(&format!(
            "  <text x=\"{legend_x}\" y=\"18\" font-size=\"13\" fill=\"#2c3e50\">{symbol}</text>\n"
        ));
        legend_x += (symbol.len() as f64) * 9.0 + 24.0;
    }

    for (symbol, mut bars) in series {
        bars.sort_by_key(|record| record.timestamp);
        svg.push_str(&format!("  <g data-symbol=\"{symbol}\">\n"));
        for record in bars {
            let slot = slots
                .iter()
                .position(|ts| *ts == record.timestamp)
                .unwrap_or(0);
            let center = MARGIN + slot_w * (slot as f64 + 0.5);
            let y_high = price_to_y(record.high, y_lower, y_upper, plot_h);
            let y_low = price_to_y(record.low, y_lower, y_upper, plot_h);
            let y_open = price_to_y(record.open, y_lower, y_upper, plot_h);
            let y_close = price_to_y(record.close, y_lower, y_upper, plot_h);

            let color = if record.close >= record.open {
                UP_COLOR
            } else {
                DOWN_COLOR
            };
            let body_top = y_open.min(y_close);
            let body_h = (y_open - y_close).abs().max(1.0);

            svg.push_str(&format!(
                "    <line x1=\"{center:.2}\" y1=\"{y_high:.2}\" x2=\"{center:.2}\" y2=\"{y_low:.2}\" stroke=\"{WICK_COLOR}\" stroke-width=\"1\"/>\n"
            ));
            svg.push_str(&format!(
                "    <rect x=\"{:.2}\" y=\"{body_top:.2}\" width=\"{body_w:.2}\" height=\"{body_h:.2}\" fill=\"{color}\"/>\n",
                center - body_w / 2.0
            ));
        }
        svg.push_str("  </g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

fn timestamp_slots(records: &[PriceRecord]) -> Vec<NaiveDateTime> {
    let mut slots: Vec<NaiveDateTime> = records.iter().map(|record| record.timestamp).collect();
    slots.sort();
    slots.dedup();
    slots
}

fn price_bounds(records: &[PriceRecord]) -> (f64, f64) {
    let y_min = records.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
    let y_max = records
        .iter()
        .map(|r| r.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = y_max - y_min;
    let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
    (y_min - pad, y_max + pad)
}

fn price_to_y(price: f64, y_lower: f64, y_upper: f64, plot_h: f64) -> f64 {
    let frac = (price - y_lower) / (y_upper - y_lower);
    MARGIN + plot_h * (1.0 - frac)
}

fn format_slot(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    let parent = Path::new(path).parent();
    if let Some(parent) = parent {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::new(format!("create dir failed: {err}")))?;
        }
    }
    Ok(())
}
