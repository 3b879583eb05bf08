use crate::models::{RawBar, TaggedBar};
use crate::provider::BarProvider;
use crate::Error;
use tracing::{error, info, warn};

/// What one symbol's fetch produced. Failures are data here, not control
/// flow: a bad symbol never aborts the rest of the batch.
#[derive(Clone, Debug)]
pub enum FetchOutcome {
    Bars(Vec<RawBar>),
    Empty,
    Failed(Error),
}

#[derive(Clone, Debug)]
pub struct SymbolFetch {
    pub symbol: String,
    pub outcome: FetchOutcome,
}

/// Request the most recent session's bars for each symbol independently.
/// No retry happens here; retry is the loop driver's cadence.
pub fn fetch_all(
    provider: &dyn BarProvider,
    symbols: &[String],
    range: &str,
    interval: &str,
) -> Vec<SymbolFetch> {
    symbols
        .iter()
        .map(|symbol| {
            let outcome = match provider.history(symbol, range, interval) {
                Ok(bars) if bars.is_empty() => FetchOutcome::Empty,
                Ok(bars) => FetchOutcome::Bars(bars),
                Err(err) => FetchOutcome::Failed(err),
            };
            SymbolFetch {
                symbol: symbol.clone(),
                outcome,
            }
        })
        .collect()
}

/// Log each outcome and produce the row-wise union of the successful
/// symbols' bars, tagged with their symbol. Returns `None` when nothing
/// succeeded (or the symbol set was empty).
pub fn combine(outcomes: Vec<SymbolFetch>) -> Option<Vec<TaggedBar>> {
    let mut tagged = Vec::new();
    for fetch in outcomes {
        match fetch.outcome {
            FetchOutcome::Bars(bars) => {
                info!(symbol = %fetch.symbol, rows = bars.len(), "fetched bars");
                tagged.extend(bars.into_iter().map(|bar| TaggedBar {
                    symbol: fetch.symbol.clone(),
                    bar,
                }));
            }
            FetchOutcome::Empty => {
                warn!(symbol = %fetch.symbol, "no data received");
            }
            FetchOutcome::Failed(err) => {
                error!(symbol = %fetch.symbol, error = %err.message, "fetch failed");
            }
        }
    }
    if tagged.is_empty() {
        None
    } else {
        Some(tagged)
    }
}
