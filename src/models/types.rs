use chrono::NaiveDateTime;

/// One bar as the provider returns it. Yahoo reports null fields for
/// non-trading gaps and for the bar still in progress, so everything past
/// the timestamp is optional until normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBar {
    pub ts: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

/// A fetched bar tagged with the symbol it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedBar {
    pub symbol: String,
    pub bar: RawBar,
}

/// The canonical record shape persisted to `stock_prices`.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceRecord {
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
