//! Splits the streaming response body into message frames and forwards the
//! decoded messages to the consumer.

use std::fmt;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::message::RawMessage;

/// Accumulates body chunks and yields complete `\r\n`-delimited frames.
///
/// Blank lines are keep-alives and never produce a frame.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
}

impl FrameDecoder {
    /// Append a body chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete frame, or `None` until more bytes arrive.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            let Some(offset) =
                self.buf[self.scanned..].iter().position(|b| *b == b'\n')
            else {
                self.scanned = self.buf.len();
                return None;
            };
            let newline = self.scanned + offset;
            self.scanned = 0;

            let mut line: Vec<u8> = self.buf.drain(..=newline).collect();
            line.pop();
            if let Some(frame) = trimmed(line) {
                return Some(frame);
            }
        }
    }

    /// Whatever is left once the body has ended cleanly.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        trimmed(std::mem::take(&mut self.buf))
    }
}

fn trimmed(mut line: Vec<u8>) -> Option<Vec<u8>> {
    while line.last().is_some_and(u8::is_ascii_whitespace) {
        line.pop();
    }
    let start = line.iter().position(|b| !b.is_ascii_whitespace())?;
    line.drain(..start);
    Some(line)
}

/// Reader loop: decode the body until it ends, breaks, or `stop` fires.
///
/// Dropping `body` on return closes the underlying connection.
pub(crate) async fn pump<S, B, E>(
    body: S,
    tx: mpsc::UnboundedSender<RawMessage>,
    stop: CancellationToken,
) where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = FrameDecoder::default();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = stop.cancelled() => {
                debug!("feed reader stopped");
                return;
            }
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                decoder.push(bytes.as_ref());
                while let Some(frame) = decoder.next_frame() {
                    if tx.send(RawMessage::decode(&frame)).is_err() {
                        debug!("feed consumer gone; closing reader");
                        return;
                    }
                }
            }
            Some(Err(err)) => {
                warn!(error = %err, "feed connection broke while reading");
                return;
            }
            None => {
                info!("feed connection closed by remote");
                if let Some(frame) = decoder.finish() {
                    let _ = tx.send(RawMessage::decode(&frame));
                }
                return;
            }
        }
    }
}
