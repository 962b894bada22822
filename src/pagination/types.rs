//! Page type and continuation helpers

use super::links::{parse_link_header, LinkRelations};
use crate::error::{Error, Result};
use crate::http::ApiResponse;
use crate::types::{Record, StringMap};
use url::Url;

/// Pagination header. The service uses the plural name, not the standard `Link`.
pub const LINKS_HEADER: &str = "links";

/// Informational total-count header
pub const RECORD_COUNT_HEADER: &str = "x-feedbin-record-count";

/// Relation that continues a walk
pub const NEXT_REL: &str = "next";

/// One decoded response of a paginated collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in response order
    pub records: Vec<Record>,
    /// Absolute URL of the next page, if advertised
    pub next_url: Option<String>,
    /// Total matching records reported by the service
    pub record_count: Option<u64>,
    /// Every relation found in the pagination header
    pub links: LinkRelations,
}

impl Page {
    /// Build a page from a response whose body must be a JSON array
    pub fn from_response(response: &ApiResponse) -> Result<Self> {
        let records = match &response.body {
            serde_json::Value::Array(items) => items.clone(),
            other => {
                return Err(Error::decode(format!(
                    "Expected a JSON array of records, got {}",
                    json_kind(other)
                )))
            }
        };

        let links = response
            .header(LINKS_HEADER)
            .map(parse_link_header)
            .unwrap_or_default();

        let record_count = response
            .header(RECORD_COUNT_HEADER)
            .and_then(|v| v.trim().parse().ok());

        Ok(Self {
            records,
            next_url: links.next().map(str::to_string),
            record_count,
            links,
        })
    }

    /// Whether another page follows
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }
}

/// Split an absolute next-page URL into (URL without query, parameters)
///
/// The fixed parameters are applied first; the next URL's own query
/// parameters override them.
pub fn follow_url(next: &str, fixed: &StringMap) -> Result<(String, StringMap)> {
    let mut url = Url::parse(next)?;
    let mut params = fixed.clone();
    for (key, value) in url.query_pairs() {
        params.insert(key.into_owned(), value.into_owned());
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok((url.to_string(), params))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
