pub mod types;

pub use types::{PriceRecord, RawBar, TaggedBar};
