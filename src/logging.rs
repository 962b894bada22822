//! Diagnostic logging setup
//!
//! Logs go to stderr or an append-only file. Stdout carries data only.

use crate::error::{Error, Result};
use crate::types::{LogFormat, LogLevel};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging options collected from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `warn` or `feedbin_tools::pagination=debug`
    pub directive: String,
    /// Line layout
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: level_directive(LogLevel::default()),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Create a config from a filter directive
    pub fn new(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            ..Default::default()
        }
    }

    /// Set the line layout
    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Log to a file
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Parse the filter directive
    pub fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.directive)
            .map_err(|e| Error::logging(format!("invalid log level '{}': {e}", self.directive)))
    }
}

/// Render a level as a filter directive
pub fn level_directive(level: LogLevel) -> String {
    tracing::Level::from(level).to_string().to_lowercase()
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = config.filter()?;
    let (writer, ansi) = match &config.file {
        Some(path) => (file_writer(path)?, false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    let installed = match config.format {
        LogFormat::Full => tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init(),
    };
    installed.map_err(|e| Error::logging(e.to_string()))
}

fn file_writer(path: &Path) -> Result<BoxMakeWriter> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::logging(format!("cannot open {}: {e}", path.display())))?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.directive, "error");
        assert_eq!(config.format, LogFormat::Full);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive(LogLevel::Debug), "debug");
        assert_eq!(level_directive(LogLevel::Warn), "warn");
    }

    #[test]
    fn test_filter_accepts_directives() {
        assert!(LoggingConfig::new("info").filter().is_ok());
        assert!(LoggingConfig::new("warn,feedbin_tools::pagination=debug")
            .filter()
            .is_ok());
    }

    #[test]
    fn test_filter_rejects_garbage() {
        let err = LoggingConfig::new("feedbin_tools=notalevel")
            .filter()
            .unwrap_err();
        assert!(matches!(err, Error::Logging { .. }));
    }

    #[test]
    fn test_file_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedbin.log");
        std::fs::write(&path, "existing\n").unwrap();

        let writer = file_writer(&path).unwrap();
        writer.make_writer().write_all(b"appended\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing\nappended\n"
        );
    }

    #[test]
    fn test_file_writer_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_writer(&dir.path().join("missing").join("x.log")).unwrap_err();
        assert!(err.to_string().contains("cannot open"));
    }
}
