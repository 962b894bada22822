// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_self)]
#![allow(clippy::needless_pass_by_value)]

//! # feedbin-tools
//!
//! A command-line client for the Feedbin v2 API that streams subscriptions,
//! feeds and entries to stdout as newline-delimited JSON.
//!
//! ## Features
//!
//! - **Link-header pagination**: follows the service's `Links` header page by page
//! - **Bulk id lookups**: starred and unread ids fetched in chunks of up to 100
//! - **Lazy streaming**: nothing is requested before the output needs it
//! - **Emission limits**: `--limit` stops the walk without extra requests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedbin_tools::http::HttpClient;
//! use feedbin_tools::output::{EmissionLimit, StreamEmitter};
//! use feedbin_tools::pagination::CursorPaginator;
//!
//! #[tokio::main]
//! async fn main() -> feedbin_tools::Result<()> {
//!     let client = HttpClient::new()?;
//!     let records = CursorPaginator::new(&client)
//!         .fetch("subscriptions.json", Default::default());
//!
//!     let mut emitter = StreamEmitter::new(std::io::stdout());
//!     emitter.emit(records, EmissionLimit::Unbounded).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                CLI (parse, settings, auth)               │
//! └───────────────┬─────────────────────────┬────────────────┘
//!                 │                         │
//!       ┌─────────┴────────┐      ┌─────────┴────────┐
//!       │ CursorPaginator  │      │    IdBatcher     │
//!       └─────────┬────────┘      └─────────┬────────┘
//!                 └────────────┬────────────┘
//!                   RecordStream (lazy)
//!                              │
//!                    ┌─────────┴─────────┐
//!                    │   StreamEmitter   │ ──▶ stdout
//!                    └───────────────────┘
//!         Transport: HttpClient ◀── CachedTransport (LRU)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP Basic credentials
pub mod auth;

/// Resource client, response cache and rate limiting
pub mod http;

/// Link-header pagination
pub mod pagination;

/// Chunked bulk lookups by id
pub mod batch;

/// Newline-delimited JSON output
pub mod output;

/// `--since` date expressions
pub mod date;

/// Feedbin endpoints and filters
pub mod api;

/// Settings file and credentials
pub mod config;

/// Diagnostic logging setup
pub mod logging;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use batch::{ChunkSize, IdBatcher};
pub use output::{EmissionLimit, StreamEmitter};
pub use pagination::{CursorPaginator, RecordStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
