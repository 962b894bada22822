//! Chunking of identifier lists

use crate::types::JsonValue;

/// Service-side ceiling on ids per bulk lookup
pub const MAX_CHUNK_SIZE: usize = 100;

/// Ids per bulk request, always within `1..=MAX_CHUNK_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSize(usize);

impl ChunkSize {
    /// Clamp a requested size into the accepted range
    pub fn new(requested: usize) -> Self {
        Self(requested.clamp(1, MAX_CHUNK_SIZE))
    }

    /// The effective size
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(MAX_CHUNK_SIZE)
    }
}

impl From<usize> for ChunkSize {
    fn from(requested: usize) -> Self {
        Self::new(requested)
    }
}

/// One group of identifiers drawn from the input in order
#[derive(Debug, Clone, PartialEq)]
pub struct IdChunk {
    /// Position of this chunk in the input
    pub index: usize,
    /// The group as it appeared in the input
    pub raw: Vec<JsonValue>,
    /// The group with blank ids removed
    pub ids: Vec<JsonValue>,
}

impl IdChunk {
    /// Whether nothing is left to look up
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids joined for the `ids` query parameter
    pub fn joined(&self) -> String {
        self.ids.iter().map(render_id).collect::<Vec<_>>().join(",")
    }
}

/// JSON falsiness: `null`, `false`, `0`, `""`, `[]` and `{}` are blank
pub fn is_blank_id(id: &JsonValue) -> bool {
    match id {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(a) => a.is_empty(),
        JsonValue::Object(o) => o.is_empty(),
    }
}

/// Render an id for a query string (strings unquoted)
pub fn render_id(id: &JsonValue) -> String {
    match id {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Partition ids into chunks of `size`, cleaning each chunk afterwards
///
/// Membership comes from the raw positions, so a chunk may end up with fewer
/// ids than `size` (or none) once blanks are dropped.
pub fn chunk_ids(ids: &[JsonValue], size: ChunkSize) -> Vec<IdChunk> {
    ids.chunks(size.get())
        .enumerate()
        .map(|(index, group)| IdChunk {
            index,
            raw: group.to_vec(),
            ids: group.iter().filter(|id| !is_blank_id(id)).cloned().collect(),
        })
        .collect()
}
