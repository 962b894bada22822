//! Output module
//!
//! Writes record streams to a sink as newline-delimited JSON.
//!
//! # Overview
//!
//! - [`StreamEmitter`] pulls records one at a time, stamps each with its
//!   emission time, and writes one JSON document per line
//! - [`EmissionLimit`] caps the number of records across every stream written
//!   through one emitter; once reached the source is no longer polled
//! - A closed pipe ends output quietly

mod emitter;

pub use emitter::{EmissionLimit, StreamEmitter, RETRIEVED_AT_FIELD};
