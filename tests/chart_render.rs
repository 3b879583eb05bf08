use chrono::NaiveDateTime;
use std::env;
use std::fs;
use stockpile::app::chart::{render_svg, write_chart};
use stockpile::models::PriceRecord;

fn record(symbol: &str, ts: &str, open: f64, high: f64, low: f64, close: f64) -> PriceRecord {
    PriceRecord {
        timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").expect("timestamp"),
        symbol: symbol.to_string(),
        open,
        high,
        low,
        close,
        volume: 1000,
    }
}

#[test]
fn renders_one_series_per_symbol() {
    let records = vec![
        record("AAA", "2024-01-01 09:30:00", 10.0, 10.5, 9.8, 10.2),
        record("AAA", "2024-01-01 09:31:00", 10.2, 10.4, 10.1, 10.3),
        record("BBB", "2024-01-01 09:30:00", 20.0, 20.5, 19.8, 19.9),
    ];
    let svg = render_svg(&records);

    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("data-symbol=\"AAA\"").count(), 1);
    assert_eq!(svg.matches("data-symbol=\"BBB\"").count(), 1);
    // background plus one body per candle
    assert_eq!(svg.matches("<rect").count(), 4);
    assert_eq!(svg.matches("<line").count(), 3);
}

#[test]
fn colors_follow_candle_direction() {
    let up = vec![record("AAA", "2024-01-01 09:30:00", 10.0, 10.5, 9.8, 10.2)];
    let down = vec![record("AAA", "2024-01-01 09:30:00", 10.2, 10.5, 9.8, 10.0)];

    assert!(render_svg(&up).contains("#26a69a"));
    assert!(!render_svg(&up).contains("#ef5350"));
    assert!(render_svg(&down).contains("#ef5350"));
}

#[test]
fn axis_labels_span_the_cycle() {
    let records = vec![
        record("AAA", "2024-01-01 09:31:00", 10.2, 10.4, 10.1, 10.3),
        record("AAA", "2024-01-01 09:30:00", 10.0, 10.5, 9.8, 10.2),
    ];
    let svg = render_svg(&records);
    assert!(svg.contains("2024-01-01 09:30:00"));
    assert!(svg.contains("2024-01-01 09:31:00"));
}

#[test]
fn write_chart_creates_the_parent_directory() {
    let mut dir = env::temp_dir();
    dir.push("stockpile_chart_test");
    let _ = fs::remove_dir_all(&dir);
    let path = dir.join("nested").join("candles.svg");
    let path_str = path.to_str().expect("path");

    let records = vec![record("AAA", "2024-01-01 09:30:00", 10.0, 10.5, 9.8, 10.2)];
    write_chart(path_str, &records).expect("write chart");

    let written = fs::read_to_string(&path).expect("read chart");
    assert!(written.contains("data-symbol=\"AAA\""));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_cycle_writes_nothing() {
    let mut path = env::temp_dir();
    path.push("stockpile_chart_empty.svg");
    let _ = fs::remove_file(&path);

    write_chart(path.to_str().expect("path"), &[]).expect("no-op");
    assert!(!path.exists());
}
