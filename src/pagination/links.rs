//! Link header parsing
//!
//! Format: `<https://api.feedbin.com/v2/entries.json?page=2>; rel="next", <...>; rel="last"`

use std::collections::BTreeMap;

/// Relation name → target URL, as advertised by one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    relations: BTreeMap<String, String>,
}

impl LinkRelations {
    /// Target URL for a relation. Relation names are case-sensitive.
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.relations.get(rel).map(String::as_str)
    }

    /// Target of the `next` relation
    pub fn next(&self) -> Option<&str> {
        self.get(super::NEXT_REL)
    }

    /// Number of distinct relations
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether no relations were found
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn insert(&mut self, rel: &str, url: &str) {
        // First occurrence wins
        self.relations
            .entry(rel.to_string())
            .or_insert_with(|| url.to_string());
    }
}

/// Parse a Link header value into its relations
///
/// URLs are taken verbatim from between `<` and `>`, so commas inside a
/// target (e.g. `ids=1,2,3`) do not split entries. A `rel` parameter may
/// carry several space-separated relation names.
pub fn parse_link_header(header: &str) -> LinkRelations {
    let mut relations = LinkRelations::default();
    let mut rest = header;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            break;
        };
        let target = after[..end].trim();
        let tail = &after[end + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());

        for param in tail[..params_end].split([';', ',']) {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if !name.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'');
            for rel in value.split_whitespace() {
                if !target.is_empty() {
                    relations.insert(rel, target);
                }
            }
        }

        rest = &tail[params_end..];
    }

    relations
}
