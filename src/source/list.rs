//! Feed discovery from a CSV file.
//!
//! The file has a header row naming its columns, one of which must be `url`:
//!
//! ```text
//! name,url
//! BBC,https://feeds.bbci.co.uk/news/rss.xml
//! ```
//!
//! Loading never fails from the caller's point of view.  A missing file, a
//! missing header or a missing `url` column all produce an empty list (and a
//! warning in the log), which the rest of the pipeline treats as "no news".

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

/// The header cell that identifies the URL column.
const URL_COLUMN: &str = "url";

/// One polled feed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedSource {
    pub url: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Load feed sources from the CSV file at `path`.
pub fn load(path: &Path) -> Vec<FeedSource> {
    match File::open(path) {
        Ok(file) => {
            let sources = from_reader(file);
            debug!(path = %path.display(), count = sources.len(), "loaded feed sources");
            sources
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot open feed source list");
            Vec::new()
        }
    }
}

/// Parse feed sources from CSV text.
///
/// Rows may have any number of cells; rows too short to reach the `url`
/// column and blank URLs are skipped.
pub fn from_reader(reader: impl Read) -> Vec<FeedSource> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = match rdr.headers() {
        Ok(headers) if headers.is_empty() => {
            warn!("feed source list is empty");
            return Vec::new();
        }
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!(error = %e, "cannot read feed source header");
            return Vec::new();
        }
    };

    let Some(url_index) = headers
        .iter()
        .position(|cell| cell.trim_start_matches('\u{feff}').trim() == URL_COLUMN)
    else {
        warn!(header = ?headers, "feed source list has no `url` column");
        return Vec::new();
    };

    let mut sources = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "feed source list unreadable");
                return Vec::new();
            }
        };
        match record.get(url_index) {
            Some(url) if !url.is_empty() => sources.push(FeedSource::new(url)),
            _ => {}
        }
    }
    sources
}
