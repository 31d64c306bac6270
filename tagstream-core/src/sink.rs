//! Ingestion sink: dispatches feed messages and writes posts to the store.
//!
//! For every post the sink runs a fixed sequence of store writes:
//!
//! 1. serialize the post to JSON
//! 2. `SET <post id> <json>`, aborting the post on failure
//! 3. `SADD hashtags <tag>`, best effort
//! 4. `LPUSH pubq <tag>:<post id>`, aborting the post on failure
//! 5. `INCR <tag>`, best effort
//!
//! The queue entry is the signal that a post is ready for publishing, so it
//! is only pushed once the record exists. Nothing is retried, and no failure
//! ever stops the sink from taking the next message.

use tracing::{error, info, warn};

use crate::{
    error::{IngestError, Result, StoreCommand},
    message::{Post, RawMessage, Tag},
    store::{Store, StoreKeys},
};

/// Running totals kept by the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Posts whose record and queue entry were both written.
    pub posts_stored: u64,
    /// Posts whose write sequence was aborted.
    pub posts_failed: u64,
    /// Failed best-effort writes (`SADD`, `INCR`).
    pub bookkeeping_failures: u64,
    /// Rate-limit, disconnect and stall notices seen.
    pub control_messages: u64,
    /// Unrecognized messages dropped.
    pub ignored_messages: u64,
}

/// Outcome of a completed post write sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWriteReport {
    /// Id of the stored post.
    pub post_id: String,
    /// Whether `SADD` succeeded.
    pub tag_registered: bool,
    /// Counter value after `INCR`, if it succeeded.
    pub counter: Option<i64>,
}

/// Consumes feed messages for one tag and writes posts to a [`Store`].
#[derive(Debug)]
pub struct IngestionSink<S> {
    store: S,
    tag: Tag,
    stats: SinkStats,
}

impl<S: Store> IngestionSink<S> {
    /// Sink writing posts filed under `tag`.
    pub fn new(store: S, tag: Tag) -> Self {
        Self {
            store,
            tag,
            stats: SinkStats::default(),
        }
    }

    /// Tag posts are filed under.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Totals so far.
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Handle one message. Errors are logged here and never returned.
    pub async fn dispatch(&mut self, message: RawMessage) {
        match message {
            RawMessage::Post(post) => match self.write_post(&post).await {
                Ok(_) => self.stats.posts_stored += 1,
                Err(err) => {
                    self.stats.posts_failed += 1;
                    log_aborted(&self.tag, &post, &err);
                }
            },
            RawMessage::RateLimit(limit) => {
                self.stats.control_messages += 1;
                warn!(track = limit.track, "Stream limit warning");
            }
            RawMessage::Disconnect(disconnect) => {
                self.stats.control_messages += 1;
                warn!(
                    code = disconnect.code,
                    stream_name = %disconnect.stream_name,
                    reason = %disconnect.reason,
                    "Stream disconnect from feed"
                );
            }
            RawMessage::StallWarning(stall) => {
                self.stats.control_messages += 1;
                warn!(
                    code = %stall.code,
                    detail = %stall.message,
                    percent_full = stall.percent_full,
                    "Stall warning"
                );
            }
            RawMessage::Unrecognized => {
                self.stats.ignored_messages += 1;
            }
        }
    }

    /// Run the post write sequence.
    ///
    /// Returns an error when the sequence was aborted: serialization, the
    /// record `SET` or the queue `LPUSH` failed. Best-effort failures are
    /// logged and reflected in the report instead.
    pub async fn write_post(&mut self, post: &Post) -> Result<PostWriteReport> {
        let json = post.to_json()?;
        let post_id = post.id();

        self.store.set(StoreKeys::post(post_id), &json).await?;

        let tag_registered = match self
            .store
            .sadd(StoreKeys::TAG_SET, self.tag.as_str())
            .await
        {
            Ok(()) => true,
            Err(err) => {
                self.stats.bookkeeping_failures += 1;
                warn!(
                    tag = %self.tag,
                    error = %err,
                    "can't add tag to the tag set"
                );
                false
            }
        };

        self.store
            .lpush(
                StoreKeys::PUBLISH_QUEUE,
                &StoreKeys::queue_entry(&self.tag, post_id),
            )
            .await?;

        let counter = match self
            .store
            .incr(StoreKeys::tag_counter(&self.tag))
            .await
        {
            Ok(count) => Some(count),
            Err(err) => {
                self.stats.bookkeeping_failures += 1;
                warn!(
                    tag = %self.tag,
                    error = %err,
                    "couldn't increment tag total count"
                );
                None
            }
        };

        info!(post_id, tag = %self.tag, "Added post to publish queue");

        Ok(PostWriteReport {
            post_id: post_id.to_string(),
            tag_registered,
            counter,
        })
    }
}

fn log_aborted(tag: &Tag, post: &Post, err: &IngestError) {
    let what = match err {
        IngestError::Serialization(_) => "encoding post to JSON failed",
        IngestError::StoreWrite {
            command: StoreCommand::Set,
            ..
        } => "can't write JSON encoded post to store",
        IngestError::StoreWrite {
            command: StoreCommand::Lpush,
            ..
        } => "can't add post to publish queue",
        _ => "post write sequence aborted",
    };
    error!(%tag, post_id = post.id(), error = %err, "{what}");
}
