//! Messages delivered by the feed and the values they carry.
//!
//! The feed multiplexes posts and out-of-band control notices over one
//! connection. Messages are told apart by the shape of the JSON document,
//! never by a type field, and anything that does not match a known shape
//! becomes [`RawMessage::Unrecognized`] so new upstream message kinds cannot
//! break ingestion.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{IngestError, Result};

/// Keyword or hashtag the running process filters the feed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// Validate a raw keyword. Fails with [`IngestError::InvalidTag`] when
    /// it is empty or only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(IngestError::InvalidTag(
                "tag must not be empty".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    /// The keyword as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A post received from the feed.
///
/// The content is opaque: it is kept as the JSON object the feed delivered
/// and serialized back verbatim when stored. Only the identifier is lifted
/// out, because it becomes the record key.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    id: String,
    content: Map<String, Value>,
}

impl Post {
    /// Build a post from a decoded JSON object.
    ///
    /// The id is taken from `id_str`, falling back to `id` (string or
    /// number). Returns `None` when neither is usable.
    pub fn from_content(content: Map<String, Value>) -> Option<Self> {
        let id = extract_id(&content)?;
        Some(Self { id, content })
    }

    /// Record key under which the post is stored.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The JSON object as delivered.
    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    /// Serialize the content back to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Post {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        self.content.serialize(serializer)
    }
}

fn extract_id(content: &Map<String, Value>) -> Option<String> {
    let from_str = content
        .get("id_str")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty());
    if let Some(id) = from_str {
        return Some(id.to_string());
    }

    match content.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Rate-limit notice: the filter matched more posts than the feed delivered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateLimitNotice {
    /// Undelivered matching posts since the connection opened.
    #[serde(default)]
    pub track: u64,
}

/// The feed is about to close the connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisconnectNotice {
    /// Upstream disconnect code.
    #[serde(default)]
    pub code: u32,
    /// Stream the notice applies to.
    #[serde(default)]
    pub stream_name: String,
    /// Human-readable cause.
    #[serde(default)]
    pub reason: String,
}

/// The client is falling behind and the feed's outbound queue is filling up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StallWarning {
    /// Warning code, e.g. `FALLING_BEHIND`.
    #[serde(default)]
    pub code: String,
    /// Upstream explanation.
    #[serde(default)]
    pub message: String,
    /// How full the outbound queue is, in percent.
    #[serde(default)]
    pub percent_full: u32,
}

/// One parse unit pushed by the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMessage {
    /// A post matching the filter.
    Post(Post),
    /// Undelivered-match notice.
    RateLimit(RateLimitNotice),
    /// The feed is closing the connection.
    Disconnect(DisconnectNotice),
    /// The consumer is falling behind.
    StallWarning(StallWarning),
    /// Any shape we do not know; dropped without a trace.
    Unrecognized,
}

impl RawMessage {
    /// Decode one frame. Malformed JSON is classified as unrecognized.
    pub fn decode(frame: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(frame) {
            Ok(value) => Self::classify(value),
            Err(_) => RawMessage::Unrecognized,
        }
    }

    /// Classify a decoded document by the keys it carries.
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut object) = value else {
            return RawMessage::Unrecognized;
        };

        if let Some(limit) = object.remove("limit") {
            return serde_json::from_value(limit)
                .map(RawMessage::RateLimit)
                .unwrap_or(RawMessage::Unrecognized);
        }
        if let Some(disconnect) = object.remove("disconnect") {
            return serde_json::from_value(disconnect)
                .map(RawMessage::Disconnect)
                .unwrap_or(RawMessage::Unrecognized);
        }
        if let Some(warning) = object.remove("warning") {
            return serde_json::from_value(warning)
                .map(RawMessage::StallWarning)
                .unwrap_or(RawMessage::Unrecognized);
        }

        if looks_like_post(&object) {
            return Post::from_content(object)
                .map(RawMessage::Post)
                .unwrap_or(RawMessage::Unrecognized);
        }

        RawMessage::Unrecognized
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RawMessage::Post(_) => "post",
            RawMessage::RateLimit(_) => "rate_limit",
            RawMessage::Disconnect(_) => "disconnect",
            RawMessage::StallWarning(_) => "stall_warning",
            RawMessage::Unrecognized => "unrecognized",
        }
    }
}

fn looks_like_post(object: &Map<String, Value>) -> bool {
    object.contains_key("retweet_count")
        || ((object.contains_key("id_str") || object.contains_key("id"))
            && (object.contains_key("text")
                || object.contains_key("full_text")))
}
