//! Feedbin v2 API surface
//!
//! Resource paths, request descriptors and the entry filter parameters.

use crate::types::{bool_param, StringMap};

pub use crate::output::RETRIEVED_AT_FIELD;

/// Fixed API origin
pub const DEFAULT_BASE_URL: &str = "https://api.feedbin.com/v2/";

/// Field echoing the requested read filter on unified entry output
pub const READ_ECHO_FIELD: &str = "is_read";

/// Subscriptions collection
pub const SUBSCRIPTIONS_PATH: &str = "subscriptions.json";

/// Unified entries collection
pub const ENTRIES_PATH: &str = "entries.json";

/// Starred entry ids
pub const STARRED_ENTRIES_PATH: &str = "starred_entries.json";

/// Unread entry ids
pub const UNREAD_ENTRIES_PATH: &str = "unread_entries.json";

/// A single feed
pub fn feed_path(feed_id: u64) -> String {
    format!("feeds/{feed_id}.json")
}

/// Entries of a single feed
pub fn feed_entries_path(feed_id: u64) -> String {
    format!("feeds/{feed_id}/entries.json")
}

/// An immutable request descriptor: where to go and what to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    path: String,
    params: StringMap,
}

impl Endpoint {
    /// Create an endpoint
    pub fn new(base_url: impl Into<String>, path: impl Into<String>, params: StringMap) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            params,
        }
    }

    /// Resource path relative to the base URL
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters
    pub fn params(&self) -> &StringMap {
        &self.params
    }

    /// Absolute URL without query string
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Query filters shared by the entry-returning commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilters {
    /// Request extended records (`mode=extended`)
    pub extended: bool,
    /// Only read (`true`) or unread (`false`) entries
    pub read: Option<bool>,
    /// Only starred entries
    pub starred: bool,
    /// Lower bound, already rendered as ISO-8601
    pub since: Option<String>,
    /// Page size hint
    pub per_page: Option<u32>,
    /// Include original content for updated entries
    pub include_original: bool,
    /// Include podcast/RSS enclosure data
    pub include_enclosure: bool,
    /// Include a diff of changed content
    pub include_content_diff: bool,
}

impl EntryFilters {
    /// Render as query parameters
    ///
    /// `read` is sent whenever it is set, with either value. The other
    /// boolean flags are only sent when enabled.
    pub fn to_params(&self) -> StringMap {
        let mut params = StringMap::new();
        if self.extended {
            params.insert("mode".to_string(), "extended".to_string());
        }
        if let Some(read) = self.read {
            params.insert("read".to_string(), bool_param(read));
        }
        if self.starred {
            params.insert("starred".to_string(), bool_param(true));
        }
        if let Some(since) = &self.since {
            params.insert("since".to_string(), since.clone());
        }
        if let Some(per_page) = self.per_page {
            params.insert("per_page".to_string(), per_page.to_string());
        }
        for (flag, name) in [
            (self.include_original, "include_original"),
            (self.include_enclosure, "include_enclosure"),
            (self.include_content_diff, "include_content_diff"),
        ] {
            if flag {
                params.insert(name.to_string(), bool_param(true));
            }
        }
        params
    }
}
