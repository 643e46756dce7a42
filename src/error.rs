//! Error types for the fallible seams of the crate.
//!
//! Most of the pipeline degrades softly (a failing feed simply yields no
//! items), so these errors rarely travel far: they exist so that the
//! soft-fail boundaries are explicit and can be logged and tested.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Why a single feed could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} when fetching {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure to read or write the persisted settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
