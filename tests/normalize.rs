use stockpile::data::normalize;
use stockpile::models::{RawBar, TaggedBar};

fn tagged(symbol: &str, bar: RawBar) -> TaggedBar {
    TaggedBar {
        symbol: symbol.to_string(),
        bar,
    }
}

fn full_bar(ts: i64) -> RawBar {
    RawBar {
        ts,
        open: Some(10.0),
        high: Some(10.5),
        low: Some(9.8),
        close: Some(10.2),
        volume: Some(1000),
    }
}

#[test]
fn produces_the_canonical_record_shape() {
    // 2024-01-01 09:30:00 UTC
    let bars = vec![tagged("AAA", full_bar(1704101400))];
    let records = normalize(&bars).expect("normalize");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.timestamp_text(), "2024-01-01 09:30:00");
    assert_eq!(record.symbol, "AAA");
    assert_eq!(record.open, 10.0);
    assert_eq!(record.high, 10.5);
    assert_eq!(record.low, 9.8);
    assert_eq!(record.close, 10.2);
    assert_eq!(record.volume, 1000);
}

#[test]
fn missing_volume_fails_the_whole_call() {
    let mut incomplete = full_bar(1704101460);
    incomplete.volume = None;
    let bars = vec![tagged("AAA", full_bar(1704101400)), tagged("AAA", incomplete)];

    let err = normalize(&bars).expect_err("should fail");
    assert!(err.message.contains("missing volume"));
}

#[test]
fn missing_price_fails_the_whole_call() {
    let mut incomplete = full_bar(1704101400);
    incomplete.close = None;
    let bars = vec![tagged("AAA", incomplete)];

    let err = normalize(&bars).expect_err("should fail");
    assert!(err.message.contains("missing close"));
}

#[test]
fn non_finite_price_fails_the_whole_call() {
    let mut bad = full_bar(1704101400);
    bad.high = Some(f64::NAN);
    let bars = vec![tagged("AAA", bad)];

    let err = normalize(&bars).expect_err("should fail");
    assert!(err.message.contains("non-finite high"));
}

#[test]
fn empty_input_normalizes_to_nothing() {
    let records = normalize(&[]).expect("normalize");
    assert!(records.is_empty());
}
