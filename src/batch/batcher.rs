//! Bulk lookups by identifier

use super::chunk::{chunk_ids, ChunkSize, IdChunk};
use crate::error::{Error, Result};
use crate::http::{RequestConfig, Transport};
use crate::pagination::{Page, RecordStream};
use crate::types::{JsonValue, Record, StringMap};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::VecDeque;
use tracing::debug;

/// Query parameter carrying the comma-joined ids
pub const IDS_PARAM: &str = "ids";

/// Issues one bulk request per chunk of identifiers
#[derive(Clone, Copy)]
pub struct IdBatcher<'a> {
    transport: &'a dyn Transport,
}

impl<'a> IdBatcher<'a> {
    /// Create a batcher over a transport
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Fetch an endpoint that returns a flat array of ids
    pub async fn fetch_ids(&self, path: &str, params: &StringMap) -> Result<Vec<JsonValue>> {
        let response = self
            .transport
            .get(path, &RequestConfig::from_params(params))
            .await?;
        match response.body {
            JsonValue::Array(ids) => {
                debug!(path, count = ids.len(), "Fetched id list");
                Ok(ids)
            }
            _ => Err(Error::decode(format!(
                "Expected a JSON array of ids from {path}"
            ))),
        }
    }

    /// Stream the records for `ids`, one request per non-empty chunk
    ///
    /// Chunks are requested in input order, each only after the previous
    /// chunk's records have been consumed. Record order within a chunk is
    /// whatever the service returns.
    pub fn fetch(
        &self,
        path: impl Into<String>,
        ids: &[JsonValue],
        chunk_size: ChunkSize,
        params: StringMap,
    ) -> RecordStream<'a> {
        let transport = self.transport;
        let path = path.into();
        let chunks: VecDeque<IdChunk> = chunk_ids(ids, chunk_size)
            .into_iter()
            .filter(|chunk| {
                if chunk.is_empty() {
                    debug!(
                        chunk = chunk.index,
                        blank = chunk.raw.len(),
                        "Skipping chunk with no usable ids"
                    );
                }
                !chunk.is_empty()
            })
            .collect();
        debug!(
            ids = ids.len(),
            chunks = chunks.len(),
            chunk_size = chunk_size.get(),
            "Planned bulk lookups"
        );

        stream::try_unfold(chunks, move |mut chunks| {
            let path = path.clone();
            let params = params.clone();
            async move {
                let Some(chunk) = chunks.pop_front() else {
                    return Ok(None);
                };
                let request = RequestConfig::from_params(&params).query(IDS_PARAM, chunk.joined());
                debug!(chunk = chunk.index, ids = chunk.ids.len(), "Fetching chunk");

                let response = transport.get(&path, &request).await?;
                let records = Page::from_response(&response)?.records;
                Ok::<_, Error>(Some((records, chunks)))
            }
        })
        .map_ok(|records| stream::iter(records.into_iter().map(Ok::<Record, Error>)))
        .try_flatten()
        .fuse()
        .boxed()
    }

    /// Identifier-only variant: yields the cleaned ids, no requests
    pub fn ids_only(ids: &[JsonValue], chunk_size: ChunkSize) -> RecordStream<'static> {
        let cleaned: Vec<JsonValue> = chunk_ids(ids, chunk_size)
            .into_iter()
            .flat_map(|chunk| chunk.ids)
            .collect();
        stream::iter(cleaned.into_iter().map(Ok::<Record, Error>)).boxed()
    }
}

impl std::fmt::Debug for IdBatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdBatcher").finish_non_exhaustive()
    }
}
