//! # Tagstream Collector
//!
//! Subscribes to the filter stream for one hashtag and mirrors every post
//! into Redis:
//!
//! - the post JSON under its id,
//! - the tag in the `hashtags` set,
//! - `<tag>:<id>` on the `pubq` publish queue,
//! - a running count under the tag itself.
//!
//! Credentials come from `TWITTER_CONSUMER_KEY`, `TWITTER_CONSUMER_SECRET`,
//! `TWITTER_ACCESS_TOKEN` and `TWITTER_ACCESS_SECRET`; Redis from
//! `REDIS_HOST`/`REDIS_PORT`. A `.env` file is applied first when present.
//!
//! ```bash
//! tagstream-collector rustlang
//! ```
//!
//! SIGINT or SIGTERM closes the stream and exits with status 0. If the feed
//! closes on its own the collector logs an error and idles until signalled.
//! Missing credentials exit with status 1.

mod lifecycle;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tagstream_config::{Config, ConfigLoad, ConfigLoadError, ConfigLoader};
use tagstream_core::{
    Tag,
    feed::{Feed, OAuthCredentials, TwitterFeed},
    sink::IngestionSink,
    store::RedisStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::lifecycle::{Shutdown, collect_until, termination_signal};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "tagstream-collector")]
#[command(
    about = "Collect a hashtag-filtered post stream into Redis for downstream publishers"
)]
#[command(version)]
struct Cli {
    /// Keyword or hashtag to filter the stream on
    tag: Option<String>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long, env = "TAGSTREAM_ENV_FILE")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            let code = err
                .downcast_ref::<ConfigLoadError>()
                .map(ConfigLoadError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(tag) = cli.tag {
        loader = loader.with_tag(tag);
    }
    if let Some(path) = cli.env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad { config, warnings } = loader.load()?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(warning = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(warning = %warning.message, "configuration warning"),
        }
    }

    let tag = Tag::new(config.tag.clone())?;
    info!("Collector: will be retrieving stream search on \"{}\"", tag);

    let feed = build_feed(&config)?;
    info!(endpoint = %feed.endpoint(), "OAuth/HTTP stream client ready");

    let store =
        RedisStore::connect(&config.store.host, config.store.port).await?;
    info!("...connected. Starting stream.");

    let subscription = feed.open(&tag).await.with_context(|| {
        format!("can't start reading stream for \"{tag}\"")
    })?;

    let sink = IngestionSink::new(store, tag);
    let (reason, stats) =
        collect_until(subscription, sink, termination_signal()).await?;

    let (signal, feed_closed_early) = match reason {
        Shutdown::Signal(signal) => (signal, false),
        Shutdown::FeedClosed { signal } => (signal, true),
    };
    info!(
        posts_stored = stats.posts_stored,
        posts_failed = stats.posts_failed,
        bookkeeping_failures = stats.bookkeeping_failures,
        control_messages = stats.control_messages,
        ignored_messages = stats.ignored_messages,
        feed_closed_early,
        "collector stopped on {signal}"
    );
    Ok(())
}

fn build_feed(config: &Config) -> anyhow::Result<TwitterFeed> {
    let credentials = OAuthCredentials::new(
        config.feed.consumer_key.as_str(),
        config.feed.consumer_secret.as_str(),
        config.feed.access_token.as_str(),
        config.feed.access_secret.as_str(),
    );

    let feed = match &config.stream_url {
        Some(endpoint) => {
            TwitterFeed::with_endpoint(credentials, endpoint.clone())
        }
        None => TwitterFeed::new(credentials),
    }
    .context("failed to set up stream client")?;
    Ok(feed)
}
