//! Common types used throughout feedbin-tools
//!
//! Shared type aliases and small enums used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single resource returned by the API. Opaque to this crate.
pub type Record = JsonValue;

/// Ordered string map used for query parameters
pub type StringMap = BTreeMap<String, String>;

// ============================================================================
// Log Level
// ============================================================================

/// Log level for the `--log-level` option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Timestamp, level, target and fields
    #[default]
    Full,
    /// Abbreviated single-line output
    Compact,
}

// ============================================================================
// Helpers
// ============================================================================

/// Render a boolean the way the API expects it in a query string
pub fn bool_param(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
