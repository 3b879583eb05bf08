use crate::config::ProviderConfig;
use crate::models::RawBar;
use crate::provider::BarProvider;
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

// Yahoo has no official API; the v8 chart endpoint rejects requests without
// a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::new("base_url must be set"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| Error::new(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn fetch_text(&self, symbol: &str, range: &str, interval: &str) -> Result<String> {
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let query = vec![
            ("range".to_string(), range.to_string()),
            ("interval".to_string(), interval.to_string()),
        ];
        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .map_err(|err| Error::new(format!("http request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::new(format!("yahoo response status: {status}")));
        }
        response
            .text()
            .map_err(|err| Error::new(format!("http read failed: {err}")))
    }
}

impl BarProvider for YahooProvider {
    fn history(&self, symbol: &str, range: &str, interval: &str) -> Result<Vec<RawBar>> {
        let text = self.fetch_text(symbol, range, interval)?;
        parse_chart_response(&text)
    }
}

/// Parse a v8 chart payload into bars. An `error` object in the payload is
/// an error; a present result with no timestamps is an empty session. Rows
/// where every field is null (non-trading gaps) are dropped.
pub fn parse_chart_response(payload: &str) -> Result<Vec<RawBar>> {
    let data: Value = serde_json::from_str(payload)
        .map_err(|err| Error::new(format!("json parse failed: {err}")))?;
    let chart = data
        .get("chart")
        .ok_or_else(|| Error::new("chart missing from response"))?;

    if let Some(error) = chart.get("error").filter(|value| !value.is_null()) {
        let code = error.get("code").and_then(|value| value.as_str()).unwrap_or("unknown");
        let description = error
            .get("description")
            .and_then(|value| value.as_str())
            .unwrap_or("no description");
        return Err(Error::new(format!("yahoo error: {code}: {description}")));
    }

    let result = chart
        .get("result")
        .and_then(|value| value.as_array())
        .and_then(|array| array.first())
        .ok_or_else(|| Error::new("chart result missing"))?;

    let timestamps = match result.get("timestamp").and_then(|value| value.as_array()) {
        Some(timestamps) => timestamps,
        None => return Ok(Vec::new()),
    };

    let quote = result
        .get("indicators")
        .and_then(|value| value.get("quote"))
        .and_then(|value| value.as_array())
        .and_then(|array| array.first())
        .ok_or_else(|| Error::new("quote data missing"))?;

    let opens = quote_series(quote, "open");
    let highs = quote_series(quote, "high");
    let lows = quote_series(quote, "low");
    let closes = quote_series(quote, "close");
    let volumes = quote_series(quote, "volume");

    let mut bars = Vec::with_capacity(timestamps.len());
    for (index, ts) in timestamps.iter().enumerate() {
        let ts = ts
            .as_i64()
            .ok_or_else(|| Error::new("timestamp is not i64"))?;
        let open = series_f64(opens, index);
        let high = series_f64(highs, index);
        let low = series_f64(lows, index);
        let close = series_f64(closes, index);
        let volume = series_i64(volumes, index);

        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none()
        {
            continue;
        }

        bars.push(RawBar {
            ts,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

fn quote_series<'a>(quote: &'a Value, field: &str) -> Option<&'a Vec<Value>> {
    quote.get(field).and_then(|value| value.as_array())
}

fn series_f64(series: Option<&Vec<Value>>, index: usize) -> Option<f64> {
    series
        .and_then(|values| values.get(index))
        .and_then(|value| value.as_f64())
}

fn series_i64(series: Option<&Vec<Value>>, index: usize) -> Option<i64> {
    series
        .and_then(|values| values.get(index))
        .and_then(|value| value.as_i64())
}
