//! Error types shared by the feed, store and sink.

use std::fmt;

use thiserror::Error;

/// Store primitive that failed, used to label [`IngestError::StoreWrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCommand {
    /// `SET` of the post record.
    Set,
    /// `SADD` onto the tag set.
    Sadd,
    /// `LPUSH` onto the publish queue.
    Lpush,
    /// `INCR` of the tag counter.
    Incr,
    /// Reachability check at connect time.
    Ping,
}

impl StoreCommand {
    /// Redis command name.
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreCommand::Set => "SET",
            StoreCommand::Sadd => "SADD",
            StoreCommand::Lpush => "LPUSH",
            StoreCommand::Incr => "INCR",
            StoreCommand::Ping => "PING",
        }
    }
}

impl fmt::Display for StoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised while subscribing to the feed or writing to the store.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The feed or the store could not be reached, or rejected us.
    #[error("connection error: {0}")]
    Connection(String),

    /// A post could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A single store command was rejected or the store was unreachable.
    #[error("store {command} on `{key}` failed: {reason}")]
    StoreWrite {
        /// Command that failed.
        command: StoreCommand,
        /// Key the command targeted.
        key: String,
        /// Underlying client error.
        reason: String,
    },

    /// Empty or whitespace-only filter keyword.
    #[error("invalid tag: {0}")]
    InvalidTag(String),
}

impl IngestError {
    /// Build a [`IngestError::StoreWrite`] from any displayable cause.
    pub fn store_write(
        command: StoreCommand,
        key: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        IngestError::StoreWrite {
            command,
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Command that failed, when this is a store error.
    pub fn store_command(&self) -> Option<StoreCommand> {
        match self {
            IngestError::StoreWrite { command, .. } => Some(*command),
            _ => None,
        }
    }
}

/// Result alias over [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;
