//! OAuth 1.0a request signing (HMAC-SHA1) for the filter stream.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
use url::Url;
use zeroize::Zeroizing;

const NONCE_LENGTH: usize = 32;

/// Application and user credentials used to sign stream requests.
#[derive(Clone)]
pub struct OAuthCredentials {
    consumer_key: String,
    consumer_secret: Zeroizing<String>,
    access_token: String,
    access_secret: Zeroizing<String>,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

impl OAuthCredentials {
    /// Consumer key and secret, then access token and secret.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: Zeroizing::new(consumer_secret.into()),
            access_token: access_token.into(),
            access_secret: Zeroizing::new(access_secret.into()),
        }
    }
}

/// Builds `Authorization: OAuth ...` header values.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: OAuthCredentials,
}

impl OAuthSigner {
    /// Signer for `credentials`.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self { credentials }
    }

    /// Sign a request with a fresh nonce and the current time.
    ///
    /// `params` are the form-encoded body parameters; query parameters are
    /// read from `url`.
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        params: &[(&str, &str)],
    ) -> String {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_with(method, url, params, &nonce, timestamp)
    }

    /// Sign with a fixed nonce and timestamp.
    pub fn authorization_with(
        &self,
        method: &str,
        url: &Url,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signature = self.signature(method, url, params, &oauth_params);
        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort_unstable();

        let fields = oauth_params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }

    fn signature(
        &self,
        method: &str,
        url: &Url,
        params: &[(&str, &str)],
        oauth_params: &[(&str, &str)],
    ) -> String {
        let base = signature_base_string(method, url, params, oauth_params);
        let key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_secret)
        );

        type HmacSha1 = Hmac<Sha1>;

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .expect("HMAC-SHA-1 accepts keys of any size");
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

fn signature_base_string(
    method: &str,
    url: &Url,
    params: &[(&str, &str)],
    oauth_params: &[(&str, &str)],
) -> String {
    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (encode(&key), encode(&value)))
        .chain(
            params
                .iter()
                .chain(oauth_params.iter())
                .map(|(key, value)| (encode(key), encode(value))),
        )
        .collect();
    encoded.sort_unstable();

    let parameter_string = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&parameter_string)
    )
}

fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// RFC 3986 percent-encoding: everything but unreserved characters.
pub(crate) fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";

    fn example_signer() -> OAuthSigner {
        OAuthSigner::new(OAuthCredentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        ))
    }

    fn example_url() -> Url {
        Url::parse(
            "https://api.twitter.com/1.1/statuses/update.json?include_entities=true",
        )
        .expect("url")
    }

    #[test]
    fn base_string_matches_published_example() {
        let oauth = [
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            (
                "oauth_token",
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            ),
            ("oauth_version", "1.0"),
        ];

        let base = signature_base_string(
            "post",
            &example_url(),
            &[("status", STATUS)],
            &oauth,
        );

        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn header_carries_published_signature() {
        let header = example_signer().authorization_with(
            "POST",
            &example_url(),
            &[("status", STATUS)],
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            1318622958,
        );

        assert!(header.starts_with("OAuth "));
        assert!(
            header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""),
            "unexpected header: {header}"
        );
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
    }

    #[test]
    fn fresh_nonces_differ() {
        let signer = example_signer();
        let url = example_url();
        let first = signer.authorization("POST", &url, &[]);
        let second = signer.authorization("POST", &url, &[]);
        assert_ne!(first, second);
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", example_signer());
        assert!(!rendered.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(rendered.contains("<redacted>"));
    }
}
