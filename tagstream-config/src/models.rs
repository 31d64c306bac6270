//! Composed configuration types.

use std::fmt;

use url::Url;
use zeroize::Zeroizing;

/// Fully composed collector configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Stream API credentials.
    pub feed: FeedCredentials,
    /// Redis endpoint.
    pub store: StoreConfig,
    /// Keyword the feed is filtered on.
    pub tag: String,
    /// Filter stream endpoint override.
    pub stream_url: Option<Url>,
    /// How the configuration was obtained.
    pub metadata: ConfigMetadata,
}

/// Provenance details, logged at startup.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    /// Whether a dotenv file was found and applied.
    pub env_file_loaded: bool,
}

/// Where Redis listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Hostname or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// OAuth 1.0a credentials for the stream API.
#[derive(Clone)]
pub struct FeedCredentials {
    /// Application key.
    pub consumer_key: String,
    /// Application secret.
    pub consumer_secret: Zeroizing<String>,
    /// User access token.
    pub access_token: String,
    /// User access token secret.
    pub access_secret: Zeroizing<String>,
}

impl fmt::Debug for FeedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}
