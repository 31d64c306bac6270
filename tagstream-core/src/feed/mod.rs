//! Feed subscriber: a filtered, push-based message source.
//!
//! A [`Feed`] opens a [`FeedSubscription`]. The subscription is split into a
//! [`MessageStream`] drained by exactly one consumer and a [`StopHandle`] that
//! can close the connection from anywhere. Messages arrive in the order the
//! feed delivered them; the stream cannot be restarted once it has ended.

mod frame;
mod oauth;
mod twitter;

pub use frame::FrameDecoder;
pub use oauth::{OAuthCredentials, OAuthSigner};
pub use twitter::{DEFAULT_STREAM_URL, TwitterFeed};

use std::fmt;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{error::Result, message::RawMessage, message::Tag};

/// Source of a keyword-filtered message stream.
#[async_trait]
pub trait Feed: Send + Sync {
    /// Open a subscription matching `tag`, with stall warnings enabled.
    ///
    /// Fails with [`IngestError::Connection`](crate::IngestError::Connection)
    /// when the feed is unreachable or rejects the filter or credentials.
    async fn open(&self, tag: &Tag) -> Result<FeedSubscription>;
}

/// A live subscription: the message sequence plus its stop switch.
#[derive(Debug)]
pub struct FeedSubscription {
    messages: MessageStream,
    stop: StopHandle,
}

impl FeedSubscription {
    /// Wrap a channel fed by some producer that honours `stop`.
    pub fn new(
        rx: mpsc::UnboundedReceiver<RawMessage>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            messages: MessageStream {
                rx,
                stop: stop.clone(),
            },
            stop: StopHandle { token: stop },
        }
    }

    /// Spawn a reader task decoding a streaming body of `\r\n`-delimited
    /// JSON frames.
    pub fn from_body<S, B, E>(body: S) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = CancellationToken::new();
        tokio::spawn(frame::pump(body, tx, stop.clone()));
        Self::new(rx, stop)
    }

    /// Another handle to this subscription's stop switch.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Separate the consumer side from the stop switch.
    pub fn split(self) -> (MessageStream, StopHandle) {
        (self.messages, self.stop)
    }
}

/// Single-consumer, in-order sequence of feed messages.
#[derive(Debug)]
pub struct MessageStream {
    rx: mpsc::UnboundedReceiver<RawMessage>,
    stop: CancellationToken,
}

impl MessageStream {
    /// Next message, or `None` once the feed was stopped or closed.
    ///
    /// After a stop, messages still buffered are not delivered.
    pub async fn next(&mut self) -> Option<RawMessage> {
        if self.stop.is_cancelled() {
            self.rx.close();
            return None;
        }

        tokio::select! {
            biased;
            _ = self.stop.cancelled() => {
                self.rx.close();
                None
            }
            message = self.rx.recv() => message,
        }
    }
}

/// Closes the feed connection. Cloneable and idempotent.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Close the connection and end the message stream.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            info!("stopping feed subscription");
            self.token.cancel();
        }
    }

    /// Whether [`StopHandle::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
