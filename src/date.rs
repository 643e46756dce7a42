//! Feed timestamp handling.
//!
//! Items keep their `pubDate` as the raw string from the feed; every
//! comparison re-parses it through this module.  Nothing here returns an
//! error: an unparsable date is simply "not today" and sorts as the epoch.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};

/// The RSS `pubDate` layout, e.g. `Tue, 10 Mar 2026 12:00:00 +0900`.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// [`PUB_DATE_FORMAT`] after the weekday has been dropped.
const PUB_DATE_FORMAT_NO_WEEKDAY: &str = "%d %b %Y %H:%M:%S %z";

/// Parse a feed timestamp.
///
/// The numeric-offset layout is tried first; RFC 2822 is the fallback so that
/// feeds using zone names such as `GMT` still parse.  A weekday that
/// disagrees with the date is ignored: the date is parsed again without it.
pub fn parse(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_str(raw, PUB_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .or_else(|| {
            let rest = strip_weekday(raw)?;
            DateTime::parse_from_str(rest, PUB_DATE_FORMAT_NO_WEEKDAY)
                .or_else(|_| DateTime::parse_from_rfc2822(rest))
                .ok()
        })
}

/// `"Wed, 10 Mar ..."` -> `"10 Mar ..."`; `None` without a leading weekday.
fn strip_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(',')?;
    let day = day.trim();
    if day.is_empty() || !day.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(rest.trim_start())
}

/// Sort key for a feed timestamp: unparsable dates become the Unix epoch so
/// they rank after everything else in a newest-first ordering.
pub fn parse_or_epoch(raw: &str) -> DateTime<Utc> {
    parse(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Whether `raw` falls on the same calendar day as `now`, in `now`'s zone.
///
/// Compares year and day-of-year, so the same date in a different year never
/// counts.
pub fn is_today<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>) -> bool {
    let Some(published) = parse(raw) else {
        return false;
    };
    let local = published.with_timezone(&now.timezone());
    local.year() == now.year() && local.ordinal() == now.ordinal()
}
