//! Process lifecycle: run the pipeline until a termination signal arrives,
//! then stop the feed and wait for the consumer.
//!
//! The process only ever exits on a signal. A feed that closes on its own is
//! logged as an error and the collector stays up, idle, until it is told to
//! stop.

use std::future::Future;

use anyhow::Context;
use tagstream_core::{
    Store,
    feed::FeedSubscription,
    pipeline,
    sink::{IngestionSink, SinkStats},
};
use tracing::{error, info, warn};

/// How the collector reached shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The signal arrived while the feed was live.
    Signal(&'static str),
    /// The feed closed first; `signal` arrived later.
    FeedClosed { signal: &'static str },
}

/// Drive `subscription` into `sink` on a spawned consumer task until
/// `shutdown` resolves.
pub async fn collect_until<S, F>(
    subscription: FeedSubscription,
    mut sink: IngestionSink<S>,
    shutdown: F,
) -> anyhow::Result<(Shutdown, SinkStats)>
where
    S: Store + 'static,
    F: Future<Output = &'static str>,
{
    let (messages, stop) = subscription.split();
    let mut consumer =
        tokio::spawn(async move { pipeline::run(messages, &mut sink).await });
    let mut shutdown = std::pin::pin!(shutdown);

    tokio::select! {
        signal = &mut shutdown => {
            info!("received {signal}; stopping feed");
            stop.stop();
            let stats = consumer.await.context("ingestion task failed")?;
            Ok((Shutdown::Signal(signal), stats))
        }
        joined = &mut consumer => {
            stop.stop();
            let stats = joined.context("ingestion task failed")?;
            error!(
                posts_stored = stats.posts_stored,
                "feed closed by remote; no more posts will be collected until restart"
            );
            let signal = shutdown.await;
            info!("received {signal}");
            Ok((Shutdown::FeedClosed { signal }, stats))
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
pub async fn termination_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
            },
            Err(err) => {
                warn!(error = %err, "can't install SIGTERM handler; waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl-C"
    }
}
