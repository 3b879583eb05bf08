pub mod fetch;
pub mod normalize;

pub use fetch::{combine, fetch_all, FetchOutcome, SymbolFetch};
pub use normalize::normalize;
