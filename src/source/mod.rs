//! Feed discovery, retrieval and parsing.
//!
//! * [`list`] reads the CSV of feed URLs.
//! * [`fetch`] defines the [`FeedFetcher`] seam and its HTTP implementation.
//! * [`rss`] turns a fetched body into [`NewsItem`]s.
//!
//! The pipeline in [`crate::pipeline`] strings these together; nothing in
//! this module knows about dates, keywords or notifications.

pub mod fetch;
pub mod list;
mod news_item;
pub mod rss;

// Re-export the public API of this module so callers can write
// `use crate::source::{FeedFetcher, FeedSource, NewsItem};`
pub use fetch::{FeedFetcher, HttpFetcher, DEFAULT_FETCH_TIMEOUT};
pub use list::FeedSource;
pub use news_item::{sort_newest_first, NewsItem};

#[cfg(test)]
pub(crate) use news_item::tests::make_item;
