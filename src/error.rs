use std::fmt;
use thiserror::Error;

/// Errors surfaced by the mirror library.
///
/// The taxonomy separates errors that abort a whole run (configuration,
/// arguments, API fetches, storage root) from per-entry download failures,
/// which are recorded in the run report and never abort the run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Invalid or missing settings. Fatal at startup, never retried.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A caller violated an operation's preconditions (bad journal id,
    /// inverted date range). No partial work has been performed.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Transport failure, non-success HTTP status, or a response whose
    /// embedded status field is not "ok". Fatal for the enclosing fetch.
    #[error("api request failed ({url}): {reason}")]
    Api { url: String, reason: String },

    /// Malformed JSON or an unrecognized wire value. The whole containing
    /// parse call is rejected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A single entry's content could not be downloaded or written. Recorded
    /// per entry; remaining entries continue.
    #[error("download failed for entry {entry_id}: {reason}")]
    Download { entry_id: u64, reason: String },

    /// The mirror root is missing or unusable at write time.
    #[error("mirror storage error: {0}")]
    Storage(String),
}

impl MirrorError {
    /// Creates a Config error with a custom message.
    pub fn config(msg: impl Into<String>) -> Self {
        MirrorError::Config(msg.into())
    }

    /// Creates an Argument error with a custom message.
    pub fn argument(msg: impl Into<String>) -> Self {
        MirrorError::Argument(msg.into())
    }

    /// Creates an Api error from the request URL and an underlying cause.
    pub fn api(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        MirrorError::Api {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a Parse error from an underlying cause.
    pub fn parse(err: impl fmt::Display) -> Self {
        MirrorError::Parse(err.to_string())
    }

    /// Creates a Download error for a single entry.
    pub fn download(entry_id: u64, reason: impl fmt::Display) -> Self {
        MirrorError::Download {
            entry_id,
            reason: reason.to_string(),
        }
    }

    /// Creates a Storage error with a custom message.
    pub fn storage(msg: impl Into<String>) -> Self {
        MirrorError::Storage(msg.into())
    }

    /// Returns true if this is a per-entry download failure.
    pub fn is_download(&self) -> bool {
        matches!(self, MirrorError::Download { .. })
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = MirrorError::api("https://example.test/api/1/journals", "status 500");
        let msg = err.to_string();
        assert!(msg.contains("https://example.test/api/1/journals"));
        assert!(msg.contains("status 500"));
    }

    #[test]
    fn test_download_carries_entry_id() {
        let err = MirrorError::download(42, "connection reset");
        assert!(err.is_download());
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_parse_from_serde_error() {
        let underlying = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = MirrorError::parse(underlying);
        assert!(matches!(err, MirrorError::Parse(_)));
    }
}
