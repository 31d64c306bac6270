//! Fatal configuration errors.

use thiserror::Error;

use crate::constants::{
    TWITTER_ACCESS_SECRET, TWITTER_ACCESS_TOKEN, TWITTER_CONSUMER_KEY,
    TWITTER_CONSUMER_SECRET,
};

/// Configuration problems that stop the collector from starting.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// One or more OAuth variables are unset or empty.
    #[error(
        "Must set all Twitter access keys, secrets, and tokens ({}, {}, {}, and {}); missing: {}",
        TWITTER_CONSUMER_KEY,
        TWITTER_CONSUMER_SECRET,
        TWITTER_ACCESS_TOKEN,
        TWITTER_ACCESS_SECRET,
        .missing.join(", ")
    )]
    MissingCredentials {
        /// Names of the missing variables.
        missing: Vec<&'static str>,
    },
    /// The dotenv file exists but could not be parsed.
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoadError {
    /// Process exit code for a failed load.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
