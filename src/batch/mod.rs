//! Identifier batching module
//!
//! Turns a large flat list of entry ids into a bounded sequence of bulk
//! lookups, one request per chunk of at most [`MAX_CHUNK_SIZE`] ids.

mod batcher;
mod chunk;

pub use batcher::{IdBatcher, IDS_PARAM};
pub use chunk::{chunk_ids, is_blank_id, render_id, ChunkSize, IdChunk, MAX_CHUNK_SIZE};
