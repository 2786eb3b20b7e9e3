// ABOUTME: Error types for the ingestion pipeline including the FailureKind enum and IngestError struct.
// ABOUTME: Provides one constructor per failure kind plus boolean helpers for callers.

use std::fmt;

/// Categories of terminal ingestion failures.
///
/// None of these are retried internally; the caller decides whether to
/// re-submit or fall back to manual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    ConnectionFailure,
    RemoteError(u16),
    EmptyContent,
    ContentTooLarge,
    NoUsableContent,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid URL"),
            FailureKind::ConnectionFailure => write!(f, "connection failure"),
            FailureKind::RemoteError(status) => write!(f, "remote error (HTTP {})", status),
            FailureKind::EmptyContent => write!(f, "empty content"),
            FailureKind::ContentTooLarge => write!(f, "content too large"),
            FailureKind::NoUsableContent => write!(f, "no usable content"),
        }
    }
}

/// The error returned by every fallible ingestion operation.
#[derive(Debug, thiserror::Error)]
pub struct IngestError {
    pub kind: FailureKind,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ingest: {} {}: {}", self.op, self.url, self.kind)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl IngestError {
    fn new(
        kind: FailureKind,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(FailureKind::InvalidUrl, url, op, source)
    }

    /// Create a ConnectionFailure error; `source` carries the transport cause.
    pub fn connection(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(FailureKind::ConnectionFailure, url, op, source)
    }

    /// Create a RemoteError for an HTTP status of 400 or above.
    pub fn remote(url: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        Self::new(FailureKind::RemoteError(status), url, op, None)
    }

    /// Create an EmptyContent error.
    pub fn empty_content(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(FailureKind::EmptyContent, url, op, None)
    }

    /// Create a ContentTooLarge error.
    pub fn too_large(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(FailureKind::ContentTooLarge, url, op, source)
    }

    /// Create a NoUsableContent error.
    pub fn no_usable_content(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(FailureKind::NoUsableContent, url, op, None)
    }

    /// The HTTP status carried by a RemoteError.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::RemoteError(status) => Some(status),
            _ => None,
        }
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.kind == FailureKind::InvalidUrl
    }

    /// Returns true if this is a ConnectionFailure error.
    pub fn is_connection(&self) -> bool {
        self.kind == FailureKind::ConnectionFailure
    }

    /// Returns true if this is a RemoteError, whatever the status.
    pub fn is_remote(&self) -> bool {
        matches!(self.kind, FailureKind::RemoteError(_))
    }

    /// Returns true if this is an EmptyContent error.
    pub fn is_empty_content(&self) -> bool {
        self.kind == FailureKind::EmptyContent
    }

    /// Returns true if this is a ContentTooLarge error.
    pub fn is_too_large(&self) -> bool {
        self.kind == FailureKind::ContentTooLarge
    }

    /// Returns true if this is a NoUsableContent error.
    pub fn is_no_usable_content(&self) -> bool {
        self.kind == FailureKind::NoUsableContent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_reports_status() {
        let err = IngestError::remote("https://example.com/x", "Fetch", 404);
        assert!(err.is_remote());
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "ingest: Fetch https://example.com/x: remote error (HTTP 404)"
        );
    }

    #[test]
    fn connection_error_chains_cause() {
        let err = IngestError::connection(
            "https://example.com",
            "Fetch",
            Some(anyhow::anyhow!("dns lookup failed")),
        );
        assert!(err.is_connection());
        assert_eq!(err.status(), None);
        assert!(err.to_string().ends_with(": dns lookup failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn no_usable_content_has_no_source() {
        let err = IngestError::no_usable_content("https://example.com", "FetchAndSanitize");
        assert!(err.is_no_usable_content());
        assert!(std::error::Error::source(&err).is_none());
    }
}
