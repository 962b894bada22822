//! CLI runner - executes commands

use crate::api::{
    self, Endpoint, ENTRIES_PATH, READ_ECHO_FIELD, STARRED_ENTRIES_PATH, SUBSCRIPTIONS_PATH,
    UNREAD_ENTRIES_PATH,
};
use crate::auth::AuthConfig;
use crate::batch::IdBatcher;
use crate::cli::commands::{BatchArgs, Cli, Commands, EntryArgs};
use crate::config::{resolve_credentials_with, Settings};
use crate::date;
use crate::error::Result;
use crate::http::{CachedTransport, HttpClient, HttpClientConfig, RateLimiterConfig, Transport};
use crate::output::{EmissionLimit, StreamEmitter};
use crate::pagination::{CursorPaginator, RecordStream};
use crate::types::StringMap;
use std::io::Write;
use tracing::{debug, info};

/// Environment lookup used for credentials
pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// CLI runner
pub struct Runner {
    cli: Cli,
    env: EnvLookup,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env: process_env,
        }
    }

    /// Replace the environment lookup used for credentials
    #[must_use]
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Parsed arguments
    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Run the CLI command, writing records to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.run_with_writer(stdout.lock()).await.map(|_| ())
    }

    /// Run the CLI command, writing records to `out`
    ///
    /// Returns the number of records written.
    pub async fn run_with_writer<W: Write>(&self, out: W) -> Result<u64> {
        let settings = Settings::load_from(self.cli.config.as_deref())?;
        let auth = resolve_credentials_with(
            self.cli.user.as_deref(),
            self.cli.password.as_deref(),
            &settings,
            self.env,
        )?;

        // Date arguments are validated before anything touches the network
        let since = match &self.cli.command {
            Commands::Subscriptions { since, .. } => resolve_since(since.as_deref())?,
            Commands::Feed { filters, .. } | Commands::Entries { filters, .. } => {
                resolve_since(filters.since.as_deref())?
            }
            _ => None,
        };

        let base_url = self
            .cli
            .base_url
            .clone()
            .unwrap_or_else(|| settings.base_url.clone());
        let transport = self.transport(&settings, &base_url, auth)?;
        let mut emitter = StreamEmitter::new(out);
        if let Commands::Entries {
            filters: EntryArgs {
                read: Some(read), ..
            },
            ..
        } = &self.cli.command
        {
            emitter = emitter.with_field(READ_ECHO_FIELD, *read);
        }

        match &self.cli.command {
            Commands::Subscriptions {
                extended, limit, ..
            } => {
                let mut params = StringMap::new();
                if let Some(since) = since {
                    params.insert("since".to_string(), since);
                }
                if *extended {
                    params.insert("mode".to_string(), "extended".to_string());
                }
                let endpoint = Endpoint::new(&base_url, SUBSCRIPTIONS_PATH, params);
                self.paginate(&*transport, &endpoint, &mut emitter, limit.emission_limit())
                    .await?;
            }
            Commands::Feed {
                feed_id,
                filters,
                limit,
            } => {
                let endpoint = Endpoint::new(
                    &base_url,
                    api::feed_entries_path(*feed_id),
                    filters.filters(since).to_params(),
                );
                self.paginate(&*transport, &endpoint, &mut emitter, limit.emission_limit())
                    .await?;
            }
            Commands::FeedInfo { feed_id } => {
                let endpoint = Endpoint::new(&base_url, api::feed_path(*feed_id), StringMap::new());
                debug!(url = %endpoint.url(), "Fetching feed");
                let records = CursorPaginator::new(&*transport)
                    .fetch_one(endpoint.path(), endpoint.params().clone());
                emitter.emit(records, EmissionLimit::Unbounded).await?;
            }
            Commands::Entries { filters, limit } => {
                let endpoint = Endpoint::new(
                    &base_url,
                    ENTRIES_PATH,
                    filters.filters(since).to_params(),
                );
                self.paginate(&*transport, &endpoint, &mut emitter, limit.emission_limit())
                    .await?;
            }
            Commands::Starred { batch, limit } => {
                self.batched(
                    &*transport,
                    STARRED_ENTRIES_PATH,
                    batch,
                    &mut emitter,
                    limit.emission_limit(),
                )
                .await?;
            }
            Commands::Unread { batch, limit } => {
                self.batched(
                    &*transport,
                    UNREAD_ENTRIES_PATH,
                    batch,
                    &mut emitter,
                    limit.emission_limit(),
                )
                .await?;
            }
        }

        Ok(finish(&emitter))
    }

    /// Build the transport stack: client, then the optional cache
    fn transport(
        &self,
        settings: &Settings,
        base_url: &str,
        auth: AuthConfig,
    ) -> Result<Box<dyn Transport>> {
        let mut config = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(settings.timeout());
        if let Some(rps) = settings.requests_per_second {
            config = config.rate_limit(RateLimiterConfig::per_second(rps));
        }

        debug!(base_url, authenticated = auth.is_authenticated(), "Creating client");
        let client = HttpClient::with_auth(config.build(), auth)?;

        if self.cli.no_cache || !settings.cache.enabled {
            debug!("Response cache disabled");
            Ok(Box::new(client))
        } else {
            Ok(Box::new(CachedTransport::in_memory(
                client,
                settings.cache.capacity,
            )))
        }
    }

    async fn paginate<W: Write>(
        &self,
        transport: &dyn Transport,
        endpoint: &Endpoint,
        emitter: &mut StreamEmitter<W>,
        limit: EmissionLimit,
    ) -> Result<()> {
        debug!(url = %endpoint.url(), params = ?endpoint.params(), "Walking pages");
        let records =
            CursorPaginator::new(transport).fetch(endpoint.path(), endpoint.params().clone());
        emitter.emit(records, limit).await?;
        Ok(())
    }

    /// Fetch an id list, then look the ids up in bulk (or print them)
    async fn batched<W: Write>(
        &self,
        transport: &dyn Transport,
        ids_path: &str,
        batch: &BatchArgs,
        emitter: &mut StreamEmitter<W>,
        limit: EmissionLimit,
    ) -> Result<()> {
        if limit.is_reached(emitter.emitted()) {
            debug!("Emission limit already reached, skipping id lookup");
            return Ok(());
        }

        let batcher = IdBatcher::new(transport);
        let ids = batcher.fetch_ids(ids_path, &StringMap::new()).await?;

        let records: RecordStream<'_> = if batch.ids_only {
            IdBatcher::ids_only(&ids, batch.chunk_size())
        } else {
            batcher.fetch(
                ENTRIES_PATH,
                &ids,
                batch.chunk_size(),
                batch.include.filters().to_params(),
            )
        };
        emitter.emit(records, limit).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("cli", &self.cli)
            .finish_non_exhaustive()
    }
}

/// Resolve a `--since` expression into its query value
fn resolve_since(since: Option<&str>) -> Result<Option<String>> {
    since
        .map(|text| date::resolve(text).map(|instant| date::to_since_param(&instant)))
        .transpose()
}

fn finish<W: Write>(emitter: &StreamEmitter<W>) -> u64 {
    if emitter.is_closed() {
        info!(emitted = emitter.emitted(), "Output closed early");
    } else {
        info!(emitted = emitter.emitted(), "Done");
    }
    emitter.emitted()
}
