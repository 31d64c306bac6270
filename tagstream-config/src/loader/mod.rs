//! Loading and composing the collector configuration.

use std::path::PathBuf;

use url::Url;
use zeroize::Zeroizing;

pub mod error;

use self::error::ConfigLoadError;
use crate::{
    constants::{
        DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT, DEFAULT_TAG, REDIS_PORT,
        TWITTER_ACCESS_SECRET, TWITTER_ACCESS_TOKEN, TWITTER_CONSUMER_KEY,
        TWITTER_CONSUMER_SECRET, TWITTER_STREAM_URL,
    },
    models::{Config, ConfigMetadata, FeedCredentials, StoreConfig},
    sources::EnvConfig,
    validation::ConfigWarnings,
};

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    env_file: Option<PathBuf>,
    tag: Option<String>,
}

/// Result of a successful load: the config plus anything worth a warning.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    /// The composed configuration.
    pub config: Config,
    /// Fallbacks applied while composing.
    pub warnings: ConfigWarnings,
}

/// Builds a [`Config`] from the process environment and an optional `.env`
/// file.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    /// Loader using `./.env` and the default tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this dotenv file instead of `./.env`.
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Filter on `tag` instead of the default.
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.options.tag = Some(tag.into());
        self
    }

    /// Apply the `.env` file (if any), snapshot the environment and compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.compose(EnvConfig::gather(), env_file_loaded)
    }

    /// Build a [`Config`] from an environment snapshot.
    pub fn compose(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        let feed = resolve_credentials(&env)?;

        let port = match env.redis_port.as_deref() {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) => port,
                Err(err) => {
                    warnings.push_with_hint(
                        format!(
                            "Can't convert provided redis port ({raw}) to a port number: {err}"
                        ),
                        format!(
                            "Set {REDIS_PORT} to a value between 1 and 65535; using {DEFAULT_REDIS_PORT}"
                        ),
                    );
                    DEFAULT_REDIS_PORT
                }
            },
            None => DEFAULT_REDIS_PORT,
        };

        let store = StoreConfig {
            host: env
                .redis_host
                .clone()
                .unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
            port,
        };

        let tag = match self.options.tag.as_deref() {
            Some(tag) if !tag.trim().is_empty() => tag.to_string(),
            Some(_) => {
                warnings.push(format!(
                    "Empty tag argument; falling back to \"{DEFAULT_TAG}\""
                ));
                DEFAULT_TAG.to_string()
            }
            None => DEFAULT_TAG.to_string(),
        };

        let stream_url = match env.stream_url.as_deref() {
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    warnings.push_with_hint(
                        format!("Ignoring invalid {TWITTER_STREAM_URL} ({raw}): {err}"),
                        "Unset it to use the public filter stream endpoint",
                    );
                    None
                }
            },
            None => None,
        };

        Ok(ConfigLoad {
            config: Config {
                feed,
                store,
                tag,
                stream_url,
                metadata: ConfigMetadata { env_file_loaded },
            },
            warnings,
        })
    }
}

fn resolve_credentials(
    env: &EnvConfig,
) -> Result<FeedCredentials, ConfigLoadError> {
    match (
        env.consumer_key.clone(),
        env.consumer_secret.clone(),
        env.access_token.clone(),
        env.access_secret.clone(),
    ) {
        (
            Some(consumer_key),
            Some(consumer_secret),
            Some(access_token),
            Some(access_secret),
        ) => Ok(FeedCredentials {
            consumer_key,
            consumer_secret: Zeroizing::new(consumer_secret),
            access_token,
            access_secret: Zeroizing::new(access_secret),
        }),
        _ => {
            let required = [
                (TWITTER_CONSUMER_KEY, &env.consumer_key),
                (TWITTER_CONSUMER_SECRET, &env.consumer_secret),
                (TWITTER_ACCESS_TOKEN, &env.access_token),
                (TWITTER_ACCESS_SECRET, &env.access_secret),
            ];
            let missing = required
                .iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| *name)
                .collect();
            Err(ConfigLoadError::MissingCredentials { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_env() -> EnvConfig {
        EnvConfig {
            consumer_key: Some("ck".into()),
            consumer_secret: Some("cs".into()),
            access_token: Some("at".into()),
            access_secret: Some("as".into()),
            ..EnvConfig::default()
        }
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let load = ConfigLoader::new()
            .compose(full_env(), false)
            .expect("config");

        assert!(load.warnings.is_empty());
        assert_eq!(
            load.config.store,
            StoreConfig {
                host: "localhost".into(),
                port: 6379
            }
        );
        assert_eq!(load.config.tag, "OpenStackSummit");
        assert_eq!(load.config.stream_url, None);
        assert_eq!(load.config.feed.consumer_key, "ck");
        assert_eq!(load.config.feed.access_secret.as_str(), "as");
    }

    #[test]
    fn missing_credentials_are_all_named() {
        let env = EnvConfig {
            consumer_key: Some("ck".into()),
            access_token: Some("at".into()),
            ..EnvConfig::default()
        };

        let err = ConfigLoader::new()
            .compose(env, false)
            .expect_err("credentials missing");

        let ConfigLoadError::MissingCredentials { missing } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(
            missing,
            &vec!["TWITTER_CONSUMER_SECRET", "TWITTER_ACCESS_SECRET"]
        );
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("TWITTER_ACCESS_SECRET"));
    }

    #[test]
    fn invalid_port_warns_and_falls_back() {
        let env = EnvConfig {
            redis_host: Some("redis.internal".into()),
            redis_port: Some("63a9".into()),
            ..full_env()
        };

        let load = ConfigLoader::new().compose(env, true).expect("config");

        assert_eq!(load.config.store.host, "redis.internal");
        assert_eq!(load.config.store.port, 6379);
        assert_eq!(load.warnings.len(), 1);
        assert!(load.warnings.items[0].message.contains("63a9"));
        assert!(load.config.metadata.env_file_loaded);
    }

    #[test]
    fn valid_port_and_tag_are_used() {
        let env = EnvConfig {
            redis_port: Some("6380".into()),
            ..full_env()
        };

        let load = ConfigLoader::new()
            .with_tag("rustlang")
            .compose(env, false)
            .expect("config");

        assert_eq!(load.config.store.port, 6380);
        assert_eq!(load.config.tag, "rustlang");
    }

    #[test]
    fn empty_tag_falls_back_with_warning() {
        let load = ConfigLoader::new()
            .with_tag("  ")
            .compose(full_env(), false)
            .expect("config");

        assert_eq!(load.config.tag, "OpenStackSummit");
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn stream_url_override_is_validated() {
        let good = EnvConfig {
            stream_url: Some("http://127.0.0.1:8080/filter.json".into()),
            ..full_env()
        };
        let load = ConfigLoader::new().compose(good, false).expect("config");
        assert_eq!(
            load.config.stream_url.as_ref().map(Url::as_str),
            Some("http://127.0.0.1:8080/filter.json")
        );

        let bad = EnvConfig {
            stream_url: Some("not a url".into()),
            ..full_env()
        };
        let load = ConfigLoader::new().compose(bad, false).expect("config");
        assert_eq!(load.config.stream_url, None);
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let load = ConfigLoader::new()
            .compose(full_env(), false)
            .expect("config");
        let rendered = format!("{:?}", load.config.feed);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("\"cs\""));
    }
}
