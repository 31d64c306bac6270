//! The consuming loop between the feed and the sink.

use tracing::{debug, info};

use crate::{
    feed::MessageStream,
    sink::{IngestionSink, SinkStats},
    store::Store,
};

/// Drain `messages` into `sink`, one message at a time, until the feed is
/// stopped or closed. Returns the sink's totals at that point.
///
/// Each message's writes complete before the next message is taken, so
/// store writes follow feed order exactly.
pub async fn run<S: Store>(
    mut messages: MessageStream,
    sink: &mut IngestionSink<S>,
) -> SinkStats {
    info!(tag = %sink.tag(), "ingestion pipeline started");

    while let Some(message) = messages.next().await {
        debug!(kind = message.kind(), "dispatching feed message");
        sink.dispatch(message).await;
    }

    let stats = sink.stats();
    info!(
        tag = %sink.tag(),
        posts_stored = stats.posts_stored,
        posts_failed = stats.posts_failed,
        bookkeeping_failures = stats.bookkeeping_failures,
        control_messages = stats.control_messages,
        "feed ended; ingestion pipeline stopped"
    );
    stats
}
