//! Environment variable names and defaults.

/// OAuth consumer key. Required.
pub const TWITTER_CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";
/// OAuth consumer secret. Required.
pub const TWITTER_CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";
/// OAuth access token. Required.
pub const TWITTER_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
/// OAuth access token secret. Required.
pub const TWITTER_ACCESS_SECRET: &str = "TWITTER_ACCESS_SECRET";
/// Optional filter endpoint override.
pub const TWITTER_STREAM_URL: &str = "TWITTER_STREAM_URL";
/// Redis hostname.
pub const REDIS_HOST: &str = "REDIS_HOST";
/// Redis port.
pub const REDIS_PORT: &str = "REDIS_PORT";

/// Tag used when none is given on the command line.
pub const DEFAULT_TAG: &str = "OpenStackSummit";
/// Redis host when `REDIS_HOST` is unset.
pub const DEFAULT_REDIS_HOST: &str = "localhost";
/// Redis port when `REDIS_PORT` is unset or unparsable.
pub const DEFAULT_REDIS_PORT: u16 = 6379;
