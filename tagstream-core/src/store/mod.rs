//! Key-value store port used by the ingestion sink.

mod redis_store;

pub use redis_store::RedisStore;

use async_trait::async_trait;

use crate::{error::Result, message::Tag};

/// The four write primitives ingestion needs, plus a reachability check.
///
/// Every call is attempted exactly once by the sink; implementations must not
/// retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send {
    /// Unconditional `SET` without expiry.
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Add `member` to a set.
    async fn sadd(&mut self, key: &str, member: &str) -> Result<()>;

    /// Push onto the head of a list.
    async fn lpush(&mut self, key: &str, value: &str) -> Result<()>;

    /// Increment by one, returning the new value.
    async fn incr(&mut self, key: &str) -> Result<i64>;

    /// Round-trip check used once at startup.
    async fn ping(&mut self) -> Result<()>;
}

/// Key layout shared with downstream publishers.
#[derive(Debug, Clone, Copy)]
pub struct StoreKeys;

impl StoreKeys {
    /// Set of every tag ingested by any collector sharing the store.
    pub const TAG_SET: &'static str = "hashtags";

    /// List of `<tag>:<post id>` entries awaiting publication.
    pub const PUBLISH_QUEUE: &'static str = "pubq";

    /// Record key of a post: its id.
    pub fn post(id: &str) -> &str {
        id
    }

    /// Publish queue entry, `<tag>:<post id>`.
    pub fn queue_entry(tag: &Tag, post_id: &str) -> String {
        format!("{tag}:{post_id}")
    }

    /// Per-tag counter key: the tag itself.
    pub fn tag_counter(tag: &Tag) -> &str {
        tag.as_str()
    }
}
