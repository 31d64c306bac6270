use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use super::{Feed, FeedSubscription, OAuthCredentials, OAuthSigner, oauth::encode};
use crate::{
    error::{IngestError, Result},
    message::Tag,
};

/// Public filter stream endpoint.
pub const DEFAULT_STREAM_URL: &str =
    "https://stream.twitter.com/1.1/statuses/filter.json";

/// Twitter filter-stream client authorised with OAuth 1.0a.
#[derive(Debug, Clone)]
pub struct TwitterFeed {
    client: reqwest::Client,
    signer: OAuthSigner,
    endpoint: Url,
}

impl TwitterFeed {
    /// Client for [`DEFAULT_STREAM_URL`].
    pub fn new(credentials: OAuthCredentials) -> Result<Self> {
        let endpoint = Url::parse(DEFAULT_STREAM_URL).map_err(|e| {
            IngestError::Connection(format!("invalid stream endpoint: {e}"))
        })?;
        Self::with_endpoint(credentials, endpoint)
    }

    /// Client for another filter endpoint, such as a proxy.
    pub fn with_endpoint(
        credentials: OAuthCredentials,
        endpoint: Url,
    ) -> Result<Self> {
        // No overall timeout: the response body is meant to stay open.
        let client = reqwest::Client::builder()
            .user_agent(concat!("tagstream/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                IngestError::Connection(format!(
                    "failed to build HTTP client: {e}"
                ))
            })?;

        Ok(Self {
            client,
            signer: OAuthSigner::new(credentials),
            endpoint,
        })
    }

    /// Endpoint subscriptions are opened against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn filter_params(tag: &Tag) -> [(&str, &str); 2] {
    [("track", tag.as_str()), ("stall_warnings", "true")]
}

fn form_body(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl Feed for TwitterFeed {
    async fn open(&self, tag: &Tag) -> Result<FeedSubscription> {
        let params = filter_params(tag);
        let authorization =
            self.signer.authorization("POST", &self.endpoint, &params);

        debug!(endpoint = %self.endpoint, %tag, "opening filter stream");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_body(&params))
            .send()
            .await
            .map_err(|e| {
                IngestError::Connection(format!(
                    "can't reach stream endpoint {}: {e}",
                    self.endpoint
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(IngestError::Connection(format!(
                "stream endpoint rejected filter for \"{tag}\": HTTP {status} {}",
                detail.trim()
            )));
        }

        info!(%tag, "filter stream open");
        Ok(FeedSubscription::from_body(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_requests_tag_with_stall_warnings() {
        let tag = Tag::new("#Go lang").expect("tag");
        let body = form_body(&filter_params(&tag));
        assert_eq!(body, "track=%23Go%20lang&stall_warnings=true");
    }

    #[test]
    fn default_endpoint_is_filter_stream() {
        let feed = TwitterFeed::new(OAuthCredentials::new("a", "b", "c", "d"))
            .expect("client");
        assert_eq!(feed.endpoint().as_str(), DEFAULT_STREAM_URL);
    }
}
