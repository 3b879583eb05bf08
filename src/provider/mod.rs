pub mod yahoo;

use crate::models::RawBar;
use crate::Result;

/// Seam over the market-data source so the ingestion loop can be driven by
/// a mock in tests.
pub trait BarProvider {
    fn history(&self, symbol: &str, range: &str, interval: &str) -> Result<Vec<RawBar>>;
}
