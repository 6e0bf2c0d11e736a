pub mod error;
pub mod feed;
pub mod fetch;
pub mod holdings;
pub mod links;
pub mod rate_limiter;
mod xml;

#[cfg(test)]
pub(crate) mod tests;

pub use error::EdgarError;
pub use feed::{resolve_feed, FilingFeedEntry, TARGET_FORM_TYPE};
pub use fetch::{Fetch, HttpFetcher};
pub use holdings::{extract_holdings, HoldingRecord, HoldingsTable};
pub use links::{resolve_links, FilingLinkSet};
pub use rate_limiter::RateLimiter;

// Hardcoded values
pub const EDGAR_ORIGIN: &str = "https://www.sec.gov";
pub const EDGAR_FEED_URL: &str = "https://data.sec.gov/rss?cik={cik}&count={count}";
pub const USER_AGENT: &str = "software@example.com";
pub const DEFAULT_FEED_COUNT: usize = 40;
