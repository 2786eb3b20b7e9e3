// ABOUTME: FetchResult struct holding the sanitized output of one ingestion call.
// ABOUTME: Owned by the caller; serializable for the CLI's JSON output.

use serde::{Deserialize, Serialize};

/// Sanitized title/description/HTML triple produced by one ingestion call.
///
/// `title` and `description` are plain text straight from the page and must
/// still be escaped by whoever renders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FetchResult {
    pub title: Option<String>,
    pub description: Option<String>,
    pub html: String,
}

impl FetchResult {
    /// Returns true if the page had a usable title.
    pub fn has_title(&self) -> bool {
        self.title.as_ref().map_or(false, |t| !t.is_empty())
    }

    /// Returns true if the page had a usable description.
    pub fn has_description(&self) -> bool {
        self.description.as_ref().map_or(false, |d| !d.is_empty())
    }
}
