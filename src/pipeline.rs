//! One full poll across every configured feed.
//!
//! ```text
//! feed_specs.csv ──► [fetch ─► parse] × N ──► concat ──► today only ──► newest first
//! ```
//!
//! Every failure on the way degrades to "fewer items": an unreadable source
//! list gives no sources, a feed that errors or times out contributes
//! nothing, and a malformed date simply is not today.  [`IngestionPipeline::run`]
//! therefore has no error type at all.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use futures::future::join_all;
use tracing::{info, warn};

use crate::date;
use crate::error::FetchError;
use crate::source::{self, sort_newest_first, FeedFetcher, FeedSource, NewsItem, DEFAULT_FETCH_TIMEOUT};

pub struct IngestionPipeline {
    sources_path: PathBuf,
    fetcher: Arc<dyn FeedFetcher>,
    fetch_timeout: Duration,
}

impl IngestionPipeline {
    pub fn new(sources_path: impl Into<PathBuf>, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            sources_path: sources_path.into(),
            fetcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bound each feed request, whatever the fetcher itself does.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fetch every source concurrently and return today's items, newest
    /// first.
    ///
    /// The source list is re-read on each call, and the result replaces
    /// whatever the caller had before; nothing is carried between runs.
    pub async fn run<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Vec<NewsItem> {
        let sources = source::list::load(&self.sources_path);

        // join_all keeps source order, which the stable sort below relies on
        // for ties.
        let per_source = join_all(sources.iter().map(|s| self.fetch_source(s))).await;
        let fetched: Vec<NewsItem> = per_source.into_iter().flatten().collect();
        let fetched_count = fetched.len();

        let today = select_today(fetched, &now);
        info!(
            sources = sources.len(),
            fetched = fetched_count,
            today = today.len(),
            "poll complete"
        );
        today
    }

    async fn fetch_source(&self, source: &FeedSource) -> Vec<NewsItem> {
        let body = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&source.url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!(url = %source.url, error = %e, "feed fetch failed, skipping");
                return Vec::new();
            }
            Err(_) => {
                let e = FetchError::Timeout(self.fetch_timeout);
                warn!(url = %source.url, error = %e, "feed fetch failed, skipping");
                return Vec::new();
            }
        };
        source::rss::parse(&body)
    }
}

/// Keep items published on `now`'s calendar day and sort them newest first.
pub fn select_today<Tz: TimeZone>(items: Vec<NewsItem>, now: &DateTime<Tz>) -> Vec<NewsItem> {
    let mut today: Vec<NewsItem> = items
        .into_iter()
        .filter(|item| date::is_today(&item.pub_date, now))
        .collect();
    sort_newest_first(&mut today);
    today
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, FixedOffset};
    use reqwest::StatusCode;
    use tempfile::NamedTempFile;

    use crate::date::PUB_DATE_FORMAT;
    use crate::source::make_item;

    pub enum Canned {
        Body(String),
        Fail,
        Hang,
    }

    /// In-memory fetcher keyed by URL.  Unknown URLs fail like a 404.
    #[derive(Default)]
    pub struct StubFetcher {
        responses: HashMap<String, Canned>,
    }

    impl StubFetcher {
        pub fn with(mut self, url: &str, response: Canned) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            match self.responses.get(url) {
                Some(Canned::Body(body)) => Ok(body.clone()),
                Some(Canned::Hang) => std::future::pending().await,
                Some(Canned::Fail) | None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                }),
            }
        }
    }

    pub fn sources_file(urls: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name,url").unwrap();
        for (i, url) in urls.iter().enumerate() {
            writeln!(file, "feed{i},{url}").unwrap();
        }
        file
    }

    pub fn rss_doc(items: &[(&str, &str, String)]) -> String {
        let body: String = items
            .iter()
            .map(|(title, link, date)| {
                format!("<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate></item>")
            })
            .collect();
        format!("<rss version=\"2.0\"><channel><title>T</title>{body}</channel></rss>")
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 10, 18, 0, 0)
            .unwrap()
    }

    fn at(hours_before_now: i64) -> String {
        (now() - ChronoDuration::hours(hours_before_now))
            .format(PUB_DATE_FORMAT)
            .to_string()
    }

    #[tokio::test]
    async fn failed_source_contributes_nothing_and_today_items_are_sorted() {
        let a = rss_doc(&[
            ("Morning", "https://a/1", at(8)),
            ("Yesterday", "https://a/2", at(24)),
            ("Evening", "https://a/3", at(1)),
        ]);
        let fetcher = StubFetcher::default()
            .with("https://a/feed", Canned::Body(a))
            .with("https://b/feed", Canned::Fail);
        let file = sources_file(&["https://a/feed", "https://b/feed"]);

        let items = IngestionPipeline::new(file.path(), Arc::new(fetcher)).run(now()).await;

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Evening", "Morning"]);
    }

    #[tokio::test]
    async fn merges_sources_and_breaks_ties_by_source_order() {
        let same = at(2);
        let fetcher = StubFetcher::default()
            .with("https://a/feed", Canned::Body(rss_doc(&[("A", "https://a/1", same.clone())])))
            .with("https://b/feed", Canned::Body(rss_doc(&[("B", "https://b/1", same.clone()), ("B2", "https://b/2", at(0))])));
        let file = sources_file(&["https://a/feed", "https://b/feed"]);

        let items = IngestionPipeline::new(file.path(), Arc::new(fetcher)).run(now()).await;

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["B2", "A", "B"]);
    }

    #[tokio::test]
    async fn caps_each_source_at_three_items() {
        let many: Vec<_> = (0..5).map(|i| ("X", "https://a/x", at(i))).collect();
        let fetcher = StubFetcher::default().with("https://a/feed", Canned::Body(rss_doc(&many)));
        let file = sources_file(&["https://a/feed"]);

        let items = IngestionPipeline::new(file.path(), Arc::new(fetcher)).run(now()).await;
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn total_failure_yields_empty() {
        let file = sources_file(&["https://a/feed", "https://b/feed"]);
        let items = IngestionPipeline::new(file.path(), Arc::new(StubFetcher::default()))
            .run(now())
            .await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn missing_source_list_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let items = IngestionPipeline::new(dir.path().join("none.csv"), Arc::new(StubFetcher::default()))
            .run(now())
            .await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn malformed_feed_contributes_nothing() {
        let fetcher = StubFetcher::default()
            .with("https://a/feed", Canned::Body("<<<not xml".into()))
            .with("https://b/feed", Canned::Body(rss_doc(&[("Ok", "https://b/1", at(0))])));
        let file = sources_file(&["https://a/feed", "https://b/feed"]);

        let items = IngestionPipeline::new(file.path(), Arc::new(fetcher)).run(now()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Ok");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_times_out_without_blocking_others() {
        let fetcher = StubFetcher::default()
            .with("https://slow/feed", Canned::Hang)
            .with("https://a/feed", Canned::Body(rss_doc(&[("Fast", "https://a/1", at(0))])));
        let file = sources_file(&["https://slow/feed", "https://a/feed"]);

        let items = IngestionPipeline::new(file.path(), Arc::new(fetcher))
            .with_fetch_timeout(Duration::from_secs(5))
            .run(now())
            .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Fast");
    }

    #[test]
    fn select_today_drops_undated_and_other_days() {
        let items = vec![
            make_item("1", "Undated", ""),
            make_item("2", "Today", &at(3)),
            make_item("3", "Tomorrow", &at(-7)),
        ];
        let today = select_today(items, &now());
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].link, "2");
    }
}
