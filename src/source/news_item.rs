//! The canonical item type produced by the feed parser.
//!
//! `NewsItem` is an immutable value: every field is filled in once by
//! [`super::rss::parse`] and nothing downstream mutates it.
//!
//! ## Identity and dates
//!
//! The `link` is the identity key.  Two items with the same link are the same
//! item for notification purposes, whatever their other fields say.
//!
//! `pub_date` is kept exactly as the feed wrote it.  There is deliberately no
//! cached numeric timestamp; callers go through [`crate::date`] each time they
//! need to compare, so a half-built item can never carry a stale sort key.

use chrono::{DateTime, FixedOffset, Utc};
use std::cmp::Reverse;

use crate::date;

/// A single feed entry, normalised from an RSS `<item>`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewsItem {
    /// Headline with markup and entities removed.
    pub title: String,

    /// URL of the full article; the de-duplication key.
    pub link: String,

    /// Description with markup and entities removed.  May be empty.
    pub description: String,

    /// Raw `<pubDate>` text, e.g. `Tue, 10 Mar 2026 12:00:00 +0900`.
    pub pub_date: String,

    /// All text inside the `<item>` element, normalised.  Denser than the
    /// description; used as the notification body.
    pub summary: String,

    /// `<category>` text, or empty.
    pub category: String,
}

impl NewsItem {
    /// Parsed publication time, if the raw date is well-formed.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        date::parse(&self.pub_date)
    }

    /// Sort key: the publication instant, or the epoch if unparsable.
    pub fn sort_key(&self) -> DateTime<Utc> {
        date::parse_or_epoch(&self.pub_date)
    }
}

/// Sort newest first.  Stable, so items with equal timestamps (including all
/// undated ones) keep their incoming order.
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by_key(|item| Reverse(item.sort_key()));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
