//! Errors at the backend fetch boundary.

use std::time::Duration;
use thiserror::Error;

/// Text shown in the result area whenever a page fetch fails.
///
/// Transport, status, malformed-payload, and timeout failures all collapse
/// into this one notice.
pub const SEARCH_ERROR_NOTICE: &str =
    "An error occurred while fetching search results. Please try again later.";

/// Text shown in the detail overlay when enrichment fails.
pub const DETAIL_ERROR_NOTICE: &str = "Error loading details. Please try again later.";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the JSON shape the endpoint promises.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Superseded by a newer search before completing.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether the failure should be surfaced to the user.
    ///
    /// Cancellation is the only silent outcome.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}
