//! # Tagstream Core
//!
//! Core library for tagstream, the collector that mirrors a hashtag-filtered
//! post stream into Redis so downstream publishers never talk to the
//! upstream stream API themselves.
//!
//! ## Overview
//!
//! - **Feed Subscriber** ([`feed`]): opens a filtered subscription and exposes
//!   a single-consumer, in-order sequence of [`RawMessage`]s.
//! - **Ingestion Sink** ([`sink`]): classifies each message and, for posts,
//!   runs the ordered store-write sequence against a [`Store`].
//! - **Pipeline** ([`pipeline`]): the consuming loop that drains the feed into
//!   the sink until the subscription ends.
//!
//! ## Store layout
//!
//! | key | type | written by |
//! |---|---|---|
//! | `<post id>` | string | `SET`, the JSON post record |
//! | `hashtags` | set | `SADD`, every tag ever ingested |
//! | `pubq` | list | `LPUSH`, `<tag>:<post id>` entries, popped from the tail |
//! | `<tag>` | integer | `INCR`, posts ingested under the tag |
//!
//! ## Examples
//!
//! ```no_run
//! use tagstream_core::{
//!     Tag,
//!     feed::{Feed, OAuthCredentials, TwitterFeed},
//!     pipeline,
//!     sink::IngestionSink,
//!     store::RedisStore,
//! };
//!
//! async fn collect() -> Result<(), Box<dyn std::error::Error>> {
//!     let tag = Tag::new("rustlang")?;
//!     let credentials = OAuthCredentials::new("ck", "cs", "at", "as");
//!     let feed = TwitterFeed::new(credentials)?;
//!     let store = RedisStore::connect("localhost", 6379).await?;
//!
//!     let (messages, stop) = feed.open(&tag).await?.split();
//!     let mut sink = IngestionSink::new(store, tag);
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.ok();
//!         stop.stop();
//!     });
//!     let stats = pipeline::run(messages, &mut sink).await;
//!     println!("stored {} posts", stats.posts_stored);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod feed;
pub mod message;
pub mod pipeline;
pub mod sink;
pub mod store;

pub use error::{IngestError, Result, StoreCommand};
pub use message::{Post, RawMessage, Tag};
pub use store::Store;
