//! Newline-delimited JSON emitter

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Record};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::{Stream, StreamExt};
use std::io::Write;
use tracing::debug;

/// Field added to every emitted object record
pub const RETRIEVED_AT_FIELD: &str = "retrieved_at";

/// Cap on the number of records written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionLimit {
    /// Write everything
    #[default]
    Unbounded,
    /// Write at most this many records
    AtMost(u64),
}

impl EmissionLimit {
    /// Any negative value means unbounded
    pub fn from_signed(limit: i64) -> Self {
        u64::try_from(limit).map_or(Self::Unbounded, Self::AtMost)
    }

    /// Whether `emitted` records exhaust this limit
    pub fn is_reached(&self, emitted: u64) -> bool {
        match self {
            Self::Unbounded => false,
            Self::AtMost(max) => emitted >= *max,
        }
    }
}

impl From<i64> for EmissionLimit {
    fn from(limit: i64) -> Self {
        Self::from_signed(limit)
    }
}

/// Writes records as JSON lines
pub struct StreamEmitter<W: Write> {
    out: W,
    emitted: u64,
    closed: bool,
    annotations: JsonObject,
    clock: fn() -> DateTime<Utc>,
}

impl<W: Write> StreamEmitter<W> {
    /// Create an emitter writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            emitted: 0,
            closed: false,
            annotations: JsonObject::new(),
            clock: Utc::now,
        }
    }

    /// Add a fixed field to every object record
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Replace the clock used for retrieval stamps
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Records written so far, across every `emit` call
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Whether the sink has gone away
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Get the sink back
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Drain `records` into the sink, returning how many were written
    ///
    /// The limit is checked before each item is pulled, so a lazy source is
    /// never asked for a record that would not be written. A source error is
    /// returned after flushing what was already written.
    pub async fn emit<S>(&mut self, mut records: S, limit: EmissionLimit) -> Result<usize>
    where
        S: Stream<Item = Result<Record>> + Unpin,
    {
        let mut written = 0;

        while !self.closed {
            if limit.is_reached(self.emitted) {
                debug!(emitted = self.emitted, "Emission limit reached");
                break;
            }

            let Some(record) = records.next().await else {
                break;
            };

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    self.flush()?;
                    return Err(e);
                }
            };

            if self.write_record(record)? {
                written += 1;
                self.emitted += 1;
            }
        }

        self.flush()?;
        Ok(written)
    }

    /// Write one record. Returns false when the sink turned out to be closed.
    fn write_record(&mut self, record: Record) -> Result<bool> {
        let record = self.annotate(record);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        match self.out.write_all(&line) {
            Ok(()) => Ok(true),
            Err(e) => self.handle_io_error(e).map(|()| false),
        }
    }

    fn annotate(&self, record: Record) -> Record {
        match record {
            JsonValue::Object(mut fields) => {
                for (key, value) in &self.annotations {
                    fields.insert(key.clone(), value.clone());
                }
                let stamp = (self.clock)().to_rfc3339_opts(SecondsFormat::Micros, false);
                fields.insert(RETRIEVED_AT_FIELD.to_string(), JsonValue::String(stamp));
                JsonValue::Object(fields)
            }
            other => other,
        }
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match self.out.flush() {
            Ok(()) => Ok(()),
            Err(e) => self.handle_io_error(e),
        }
    }

    fn handle_io_error(&mut self, e: std::io::Error) -> Result<()> {
        match Error::output(e) {
            Error::OutputClosed => {
                debug!(emitted = self.emitted, "Output closed by reader");
                self.closed = true;
                Ok(())
            }
            e => Err(e),
        }
    }
}

impl<W: Write> std::fmt::Debug for StreamEmitter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamEmitter")
            .field("emitted", &self.emitted)
            .field("closed", &self.closed)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}
