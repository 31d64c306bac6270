#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tagstream_core::{
    IngestError, Post, RawMessage, Result, Store, StoreCommand, Tag,
    feed::{Feed, FeedSubscription},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct StoreState {
    strings: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
    lists: HashMap<String, VecDeque<String>>,
    counters: HashMap<String, i64>,
    attempts: Vec<(StoreCommand, String)>,
    failures: Vec<(StoreCommand, String)>,
}

/// In-memory store that records every attempted command and can be told to
/// fail specific ones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store state poisoned")
    }

    /// Fail the next `command` against `key`, once.
    pub fn fail_once(&self, command: StoreCommand, key: &str) {
        self.lock().failures.push((command, key.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().strings.get(key).cloned()
    }

    pub fn members(&self, key: &str) -> Vec<String> {
        self.lock()
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// List contents from head to tail.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.lock()
            .lists
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn counter(&self, key: &str) -> i64 {
        self.lock().counters.get(key).copied().unwrap_or_default()
    }

    pub fn attempts(&self) -> Vec<(StoreCommand, String)> {
        self.lock().attempts.clone()
    }

    fn attempt(&self, command: StoreCommand, key: &str) -> Result<()> {
        let mut state = self.lock();
        state.attempts.push((command, key.to_string()));
        let planned = state
            .failures
            .iter()
            .position(|(c, k)| *c == command && k == key);
        match planned {
            Some(index) => {
                state.failures.remove(index);
                Err(IngestError::store_write(command, key, "simulated failure"))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.attempt(StoreCommand::Set, key)?;
        self.lock()
            .strings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn sadd(&mut self, key: &str, member: &str) -> Result<()> {
        self.attempt(StoreCommand::Sadd, key)?;
        self.lock()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn lpush(&mut self, key: &str, value: &str) -> Result<()> {
        self.attempt(StoreCommand::Lpush, key)?;
        self.lock()
            .lists
            .entry(key.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn incr(&mut self, key: &str) -> Result<i64> {
        self.attempt(StoreCommand::Incr, key)?;
        let mut state = self.lock();
        let counter = state.counters.entry(key.to_string()).or_default();
        *counter += 1;
        Ok(*counter)
    }

    async fn ping(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Feed driven by the test: messages are pushed by hand and the connection
/// stays open until [`ScriptedFeed::hang_up`] or a stop.
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    tx: Mutex<Option<mpsc::UnboundedSender<RawMessage>>>,
    opened: Mutex<Vec<String>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message; returns false once the subscription is gone.
    pub fn push(&self, message: RawMessage) -> bool {
        self.tx
            .lock()
            .expect("feed poisoned")
            .as_ref()
            .is_some_and(|tx| tx.send(message).is_ok())
    }

    /// Remote side closes the connection.
    pub fn hang_up(&self) {
        self.tx.lock().expect("feed poisoned").take();
    }

    pub fn opened_tags(&self) -> Vec<String> {
        self.opened.lock().expect("feed poisoned").clone()
    }
}

#[async_trait]
impl Feed for ScriptedFeed {
    async fn open(&self, tag: &Tag) -> Result<FeedSubscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock().expect("feed poisoned") = Some(tx);
        self.opened
            .lock()
            .expect("feed poisoned")
            .push(tag.to_string());
        Ok(FeedSubscription::new(rx, CancellationToken::new()))
    }
}

pub fn post_message(content: Value) -> RawMessage {
    let Value::Object(content) = content else {
        panic!("post content must be an object");
    };
    RawMessage::Post(Post::from_content(content).expect("post has an id"))
}

pub fn simple_post(id: &str) -> RawMessage {
    post_message(json!({"id_str": id, "text": format!("post {id}")}))
}

pub fn tag(name: &str) -> Tag {
    Tag::new(name).expect("valid tag")
}
