//! Raw environment snapshot.

use crate::constants::{
    REDIS_HOST, REDIS_PORT, TWITTER_ACCESS_SECRET, TWITTER_ACCESS_TOKEN,
    TWITTER_CONSUMER_KEY, TWITTER_CONSUMER_SECRET, TWITTER_STREAM_URL,
};

/// Environment-derived configuration values, unvalidated.
///
/// Empty variables are treated as unset. The port and stream URL are kept as
/// raw strings so composition can warn about unparsable values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    /// `TWITTER_CONSUMER_KEY`
    pub consumer_key: Option<String>,
    /// `TWITTER_CONSUMER_SECRET`
    pub consumer_secret: Option<String>,
    /// `TWITTER_ACCESS_TOKEN`
    pub access_token: Option<String>,
    /// `TWITTER_ACCESS_SECRET`
    pub access_secret: Option<String>,
    /// `TWITTER_STREAM_URL`
    pub stream_url: Option<String>,
    /// `REDIS_HOST`
    pub redis_host: Option<String>,
    /// `REDIS_PORT`
    pub redis_port: Option<String>,
}

impl EnvConfig {
    /// Snapshot the process environment.
    pub fn gather() -> Self {
        Self {
            consumer_key: non_empty_var(TWITTER_CONSUMER_KEY),
            consumer_secret: non_empty_var(TWITTER_CONSUMER_SECRET),
            access_token: non_empty_var(TWITTER_ACCESS_TOKEN),
            access_secret: non_empty_var(TWITTER_ACCESS_SECRET),
            stream_url: non_empty_var(TWITTER_STREAM_URL),
            redis_host: non_empty_var(REDIS_HOST),
            redis_port: non_empty_var(REDIS_PORT),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
