//! CLI commands and argument parsing

use crate::api::EntryFilters;
use crate::batch::{ChunkSize, MAX_CHUNK_SIZE};
use crate::logging::LoggingConfig;
use crate::output::EmissionLimit;
use crate::types::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tools for working with the Feedbin API
#[derive(Parser, Debug)]
#[command(name = "feedbin-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feedbin account email (or FEEDBIN_USERNAME)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Feedbin account password (or FEEDBIN_PASSWORD)
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Settings file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Disable the in-memory response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Log filter, a level or any tracing directive
    #[arg(long, global = true, default_value = "error")]
    pub log_level: String,

    /// Log line layout
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Full)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging options selected on the command line
    pub fn logging(&self) -> LoggingConfig {
        let config = LoggingConfig::new(&self.log_level).format(self.log_format);
        match &self.log_file {
            Some(path) => config.file(path),
            None => config,
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List subscriptions
    Subscriptions {
        /// Only subscriptions created after this date
        #[arg(long)]
        since: Option<String>,

        /// Include extended feed metadata
        #[arg(long)]
        extended: bool,

        #[command(flatten)]
        limit: LimitArgs,
    },

    /// List the entries of one feed
    Feed {
        /// Feed id
        feed_id: u64,

        #[command(flatten)]
        filters: EntryArgs,

        #[command(flatten)]
        limit: LimitArgs,
    },

    /// Show one feed
    FeedInfo {
        /// Feed id
        feed_id: u64,
    },

    /// List entries across all subscriptions
    Entries {
        #[command(flatten)]
        filters: EntryArgs,

        #[command(flatten)]
        limit: LimitArgs,
    },

    /// List starred entries
    Starred {
        #[command(flatten)]
        batch: BatchArgs,

        #[command(flatten)]
        limit: LimitArgs,
    },

    /// List unread entries
    Unread {
        #[command(flatten)]
        batch: BatchArgs,

        #[command(flatten)]
        limit: LimitArgs,
    },
}

/// Output cap shared by every listing command
#[derive(Args, Debug, Clone, Copy)]
pub struct LimitArgs {
    /// Maximum records to write, negative for no limit
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub limit: i64,
}

impl LimitArgs {
    /// Limit as an emission cap
    pub fn emission_limit(&self) -> EmissionLimit {
        EmissionLimit::from_signed(self.limit)
    }
}

/// Flags selecting extra entry content
#[derive(Args, Debug, Clone, Default)]
pub struct IncludeArgs {
    /// Request extended entry records
    #[arg(long)]
    pub extended: bool,

    /// Include the original content of updated entries
    #[arg(long)]
    pub include_original: bool,

    /// Include enclosure data
    #[arg(long)]
    pub include_enclosure: bool,

    /// Include a diff of changed content
    #[arg(long)]
    pub include_content_diff: bool,
}

/// Entry listing filters
#[derive(Args, Debug, Clone, Default)]
pub struct EntryArgs {
    #[command(flatten)]
    pub include: IncludeArgs,

    /// Only read (`true`) or unread (`false`) entries
    #[arg(long, value_name = "BOOL")]
    pub read: Option<bool>,

    /// Only starred entries
    #[arg(long)]
    pub starred: bool,

    /// Only entries created after this date
    #[arg(long)]
    pub since: Option<String>,

    /// Entries per page
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl EntryArgs {
    /// Build query filters; `since` must already be normalized
    pub fn filters(&self, since: Option<String>) -> EntryFilters {
        EntryFilters {
            read: self.read,
            starred: self.starred,
            since,
            per_page: self.per_page,
            ..self.include.filters()
        }
    }
}

impl IncludeArgs {
    /// Build query filters from the include flags alone
    pub fn filters(&self) -> EntryFilters {
        EntryFilters {
            extended: self.extended,
            include_original: self.include_original,
            include_enclosure: self.include_enclosure,
            include_content_diff: self.include_content_diff,
            ..Default::default()
        }
    }
}

/// Options for the id-list commands
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Print entry ids instead of fetching entries
    #[arg(long)]
    pub ids_only: bool,

    /// Ids per bulk request, at most 100
    #[arg(long, default_value_t = MAX_CHUNK_SIZE)]
    pub chunk_size: usize,

    #[command(flatten)]
    pub include: IncludeArgs,
}

impl BatchArgs {
    /// Clamped chunk size
    pub fn chunk_size(&self) -> ChunkSize {
        ChunkSize::new(self.chunk_size)
    }
}
