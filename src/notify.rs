//! Interest matching and notification.
//!
//! Each check looks at the freshly ingested items, keeps those that mention
//! one of the user's interest keywords and have not been notified before, and
//! surfaces at most one of them: the first, which is the newest because the
//! pipeline sorts newest first.  Several matches in one cycle still produce a
//! single notification.
//!
//! Already-notified links are remembered in a [`SeenLinkLedger`] capped at
//! [`LEDGER_CAPACITY`] entries; the oldest link is forgotten first.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::SettingsStore;
use crate::source::NewsItem;
use crate::text::truncate_chars;

/// How many notified links are remembered.
pub const LEDGER_CAPACITY: usize = 50;

/// Longest notification title, in characters.
pub const NOTIFICATION_TITLE_LIMIT: usize = 100;

/// Longest notification body, in characters.
pub const NOTIFICATION_BODY_LIMIT: usize = 300;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Insertion-ordered set of notified links, never longer than
/// [`LEDGER_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SeenLinkLedger {
    links: VecDeque<String>,
}

impl SeenLinkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.iter().any(|l| l == link)
    }

    /// Record `link`, evicting the oldest entries if over capacity.
    ///
    /// Returns `false` (and leaves the order alone) if it was already present.
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        let link = link.into();
        if self.contains(&link) {
            return false;
        }
        self.links.push_back(link);
        while self.links.len() > LEDGER_CAPACITY {
            self.links.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl From<Vec<String>> for SeenLinkLedger {
    /// Rebuild from persisted form, re-applying the uniqueness and capacity
    /// rules in case the file was edited by hand.
    fn from(links: Vec<String>) -> Self {
        let mut ledger = Self::new();
        for link in links {
            ledger.insert(link);
        }
        ledger
    }
}

impl From<SeenLinkLedger> for Vec<String> {
    fn from(ledger: SeenLinkLedger) -> Self {
        ledger.links.into()
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Result of one [`evaluate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub notify: Option<NewsItem>,
    pub updated_ledger: SeenLinkLedger,
}

/// Whether `item`'s title or description contains any keyword,
/// case-insensitively.  Blank keywords match nothing.
pub fn matches_interest(item: &NewsItem, keywords: &BTreeSet<String>) -> bool {
    let title = item.title.to_lowercase();
    let description = item.description.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .any(|k| title.contains(&k) || description.contains(&k))
}

/// Pick at most one unseen, interesting item and record it in the ledger.
///
/// `items` must already be ordered by preference (newest first); the first
/// qualifying item wins.
pub fn evaluate(items: &[NewsItem], keywords: &BTreeSet<String>, ledger: &SeenLinkLedger) -> MatchOutcome {
    let mut updated_ledger = ledger.clone();

    let notify = items
        .iter()
        .find(|item| !ledger.contains(&item.link) && matches_interest(item, keywords))
        .cloned();

    if let Some(item) = &notify {
        updated_ledger.insert(item.link.clone());
    }

    MatchOutcome { notify, updated_ledger }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// What the delivery layer needs to show one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Stable per link, so re-delivery replaces rather than duplicates.
    pub id: i32,
    pub title: String,
    pub body: String,
    /// Opened when the user acts on the notification.
    pub url: String,
}

impl NotificationRequest {
    pub fn for_item(item: &NewsItem) -> Self {
        Self {
            id: notification_id(&item.link),
            title: truncate_chars(&item.title, NOTIFICATION_TITLE_LIMIT),
            body: truncate_chars(&item.summary, NOTIFICATION_BODY_LIMIT),
            url: item.link.clone(),
        }
    }
}

/// 31-multiplier hash over UTF-16 code units.  Deterministic across runs and
/// platforms, unlike `std`'s hashers.
pub fn notification_id(link: &str) -> i32 {
    link.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Something that can put a notification in front of the user.
pub trait Notifier: Send + Sync {
    fn deliver(&self, request: &NotificationRequest) -> anyhow::Result<()>;
}

/// Records notifications in the log.  The terminal front-end additionally
/// shows them in its status bar.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, request: &NotificationRequest) -> anyhow::Result<()> {
        info!(
            id = request.id,
            title = %request.title,
            url = %request.url,
            "interest news arrived"
        );
        Ok(())
    }
}

/// Run one notification cycle against the persisted keywords and ledger.
///
/// Matching and the ledger update happen inside the store's lock, so two
/// overlapping cycles cannot both notify the same link.
pub fn check(
    store: &SettingsStore,
    items: &[NewsItem],
    notifier: &dyn Notifier,
) -> anyhow::Result<Option<NotificationRequest>> {
    let picked = store.update(|settings| {
        let outcome = evaluate(items, &settings.interests, &settings.notified_links);
        settings.notified_links = outcome.updated_ledger;
        outcome.notify
    });

    let Some(item) = picked else {
        debug!(candidates = items.len(), "no new item matches interests");
        return Ok(None);
    };

    let request = NotificationRequest::for_item(&item);
    notifier.deliver(&request)?;
    Ok(Some(request))
}
