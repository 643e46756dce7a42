//! Persisted user settings: interest keywords, the notified-link ledger and
//! the background check interval.
//!
//! Settings live in a small JSON file.  The core never reads them ambiently;
//! [`SettingsStore`] hands out snapshots and applies read-modify-write updates
//! under a single lock, persisting before the lock is released.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SettingsError;
use crate::notify::SeenLinkLedger;

/// Background checks never run more often than this.
pub const MIN_CHECK_INTERVAL_MINUTES: u64 = 15;

/// Keywords a fresh install starts with.
const DEFAULT_INTERESTS: &[&str] = &["AI", "로봇", "테크"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Case-insensitive keywords; an empty set disables notifications.
    pub interests: BTreeSet<String>,
    /// Links that have already produced a notification.
    pub notified_links: SeenLinkLedger,
    /// Minutes between background checks, at least
    /// [`MIN_CHECK_INTERVAL_MINUTES`].
    pub check_interval_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interests: DEFAULT_INTERESTS.iter().map(|k| k.to_string()).collect(),
            notified_links: SeenLinkLedger::new(),
            check_interval_minutes: MIN_CHECK_INTERVAL_MINUTES,
        }
    }
}

impl Settings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(clamp_interval(self.check_interval_minutes) * 60)
    }

    /// Store a new interval, raised to the minimum if needed.  Returns the
    /// value actually stored.
    pub fn set_check_interval(&mut self, minutes: u64) -> u64 {
        self.check_interval_minutes = clamp_interval(minutes);
        self.check_interval_minutes
    }

    /// Add a keyword.  Blank input is ignored.
    pub fn add_interest(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        !keyword.is_empty() && self.interests.insert(keyword.to_string())
    }

    pub fn remove_interest(&mut self, keyword: &str) -> bool {
        self.interests.remove(keyword.trim())
    }
}

pub fn clamp_interval(minutes: u64) -> u64 {
    minutes.max(MIN_CHECK_INTERVAL_MINUTES)
}

/// Read settings from `path`.
pub fn read(path: &Path) -> Result<Settings, SettingsError> {
    let text = fs::read_to_string(path)?;
    let mut settings: Settings = serde_json::from_str(&text)?;
    settings.check_interval_minutes = clamp_interval(settings.check_interval_minutes);
    Ok(settings)
}

/// Write settings to `path` via a temporary file, so a crash mid-write never
/// leaves a truncated file behind.
pub fn write(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Shared, lock-protected settings backed by a file.
pub struct SettingsStore {
    path: PathBuf,
    inner: Mutex<Settings>,
}

impl SettingsStore {
    /// Load settings, initialising the file with defaults on first run.
    ///
    /// An unreadable or corrupt file falls back to defaults with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match read(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings yet, writing defaults");
                let defaults = Settings::default();
                if let Err(e) = write(&path, &defaults) {
                    warn!(path = %path.display(), error = %e, "cannot write default settings");
                }
                defaults
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot load settings, using defaults");
                Settings::default()
            }
        };

        Self {
            path,
            inner: Mutex::new(settings),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Settings> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Settings {
        self.lock().clone()
    }

    /// Apply `f` and persist the result, all under the lock.
    ///
    /// A failed write is logged; the in-memory settings keep the change so
    /// the running process stays consistent.
    pub fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> R {
        let mut settings = self.lock();
        let result = f(&mut settings);
        settings.check_interval_minutes = clamp_interval(settings.check_interval_minutes);
        if let Err(e) = write(&self.path, &settings) {
            warn!(path = %self.path.display(), error = %e, "cannot persist settings");
        }
        result
    }
}
