pub mod questdb;

use crate::models::PriceRecord;

/// Seam over the persistence layer so the ingestion loop can be driven by
/// a recording sink in tests.
pub trait RecordSink {
    /// Persist one cycle's batch. Returns the number of rows written; a
    /// failed batch is rolled back in full, logged, and reported as 0.
    fn save(&mut self, records: &[PriceRecord]) -> usize;
}
