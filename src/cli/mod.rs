//! CLI module
//!
//! Command-line interface for the Feedbin API.
//!
//! # Commands
//!
//! - `subscriptions` - List subscriptions
//! - `feed` - List the entries of one feed
//! - `feed-info` - Show one feed
//! - `entries` - List entries across all subscriptions
//! - `starred` - Look up starred entries in bulk
//! - `unread` - Look up unread entries in bulk

mod commands;
mod runner;

pub use commands::{BatchArgs, Cli, Commands, EntryArgs, IncludeArgs, LimitArgs};
pub use runner::{EnvLookup, Runner};
