//! Link-following paginator

use super::types::{follow_url, Page};
use crate::error::{Error, Result};
use crate::http::{RequestConfig, Transport};
use crate::types::{Record, StringMap};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Lazy, single-use sequence of records
pub type RecordStream<'a> = BoxStream<'a, Result<Record>>;

/// Where the walk goes next
#[derive(Debug)]
enum Cursor {
    Start { path: String },
    Next { url: String },
    Done,
}

/// State carried between pages
#[derive(Debug)]
struct Walk {
    cursor: Cursor,
    fixed: StringMap,
    /// Identity of every request issued so far, the first page included
    seen: HashSet<String>,
    pages: usize,
    records: usize,
}

impl Walk {
    fn new(path: String, fixed: StringMap) -> Self {
        Self {
            cursor: Cursor::Start { path },
            fixed,
            seen: HashSet::new(),
            pages: 0,
            records: 0,
        }
    }

    /// The next request to issue, or `None` once the walk is over
    ///
    /// A request identical to one already issued ends the walk.
    fn next_request(
        &mut self,
        transport: &dyn Transport,
    ) -> Result<Option<(String, RequestConfig)>> {
        let (url, request) = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Start { path } => (path, RequestConfig::from_params(&self.fixed)),
            Cursor::Next { url } => {
                let (url, params) = follow_url(&url, &self.fixed)?;
                (url, RequestConfig::from_params(&params))
            }
            Cursor::Done => return Ok(None),
        };

        let resolved = transport.resolve_url(&url);
        let resolved = Url::parse(&resolved).map_or(resolved, |u| u.to_string());
        if !self.seen.insert(request.cache_key(&resolved)) {
            warn!(url = %resolved, "Next link repeats an already fetched page, stopping");
            return Ok(None);
        }
        Ok(Some((url, request)))
    }

    fn advance(&mut self, page: &Page) {
        self.pages += 1;
        self.records += page.records.len();
        debug!(
            page = self.pages,
            records = page.records.len(),
            total_hint = ?page.record_count,
            "Fetched page"
        );

        self.cursor = match &page.next_url {
            Some(next) => Cursor::Next { url: next.clone() },
            None => {
                debug!(
                    pages = self.pages,
                    records = self.records,
                    "Pagination complete"
                );
                Cursor::Done
            }
        };
    }
}

/// Follows `rel="next"` links until the service stops advertising one
#[derive(Clone, Copy)]
pub struct CursorPaginator<'a> {
    transport: &'a dyn Transport,
}

impl<'a> CursorPaginator<'a> {
    /// Create a paginator over a transport
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Stream every record of a paginated collection
    ///
    /// `params` are sent with the first request and re-applied to every
    /// followed link (the link's own query parameters take precedence).
    /// Any failed page ends the stream after yielding the error.
    pub fn fetch(&self, path: impl Into<String>, params: StringMap) -> RecordStream<'a> {
        let transport = self.transport;
        let walk = Walk::new(path.into(), params);

        stream::try_unfold(walk, move |mut walk| async move {
            let Some((url, request)) = walk.next_request(transport)? else {
                return Ok(None);
            };
            let response = transport.get(&url, &request).await?;
            let page = Page::from_response(&response)?;
            walk.advance(&page);
            Ok::<_, Error>(Some((page.records, walk)))
        })
        .map_ok(|records| stream::iter(records.into_iter().map(Ok::<Record, Error>)))
        .try_flatten()
        .fuse()
        .boxed()
    }

    /// Stream a single-object resource as a one-record sequence
    pub fn fetch_one(&self, path: impl Into<String>, params: StringMap) -> RecordStream<'a> {
        let transport = self.transport;
        let path = path.into();

        stream::once(async move {
            let response = transport
                .get(&path, &RequestConfig::from_params(&params))
                .await?;
            Ok::<Record, Error>(response.body)
        })
        .boxed()
    }
}

impl std::fmt::Debug for CursorPaginator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorPaginator").finish_non_exhaustive()
    }
}
