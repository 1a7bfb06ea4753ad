//! Multi-source search aggregation.
//!
//! A `SearchProvider` answers web and image lookups. The `SearchAggregator`
//! fans a query out to general, platform-scoped and image lookups, tags the
//! results by source and orders them with the `RelevanceRanker`.

mod aggregator;
mod google;
mod ranker;
mod types;

pub use aggregator::SearchAggregator;
pub use google::GoogleSearchClient;
pub use ranker::{query_terms, RelevanceRanker};
pub use types::*;
