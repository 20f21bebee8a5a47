//! Cache / fetch layer: keyed cached entries with freshness flags, plus the
//! refresh coordinator that performs (cancellable) background refetches.

mod fetch;
mod store;

pub use fetch::Fetcher;
pub use store::RecordCache;
