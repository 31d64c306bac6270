use std::fmt;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use super::Store;
use crate::error::{IngestError, Result, StoreCommand};

/// Redis-backed [`Store`] over a single managed connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStore {
    /// Connect and verify reachability with a `PING`.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let redis_url = format!("redis://{host}:{port}/");
        info!("Connecting to Redis at {}:{}", host, port);

        let client = redis::Client::open(redis_url.as_str()).map_err(|e| {
            IngestError::Connection(format!(
                "can't create redis client for {host}:{port}: {e}"
            ))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            IngestError::Connection(format!(
                "can't connect to redis on {host}:{port}: {e}"
            ))
        })?;

        let mut store = Self { conn };
        store.ping().await.map_err(|e| {
            IngestError::Connection(format!(
                "redis on {host}:{port} did not answer PING: {e}"
            ))
        })?;

        info!("Successfully connected to Redis");
        Ok(store)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        debug!("Store SET: {}", key);
        self.conn
            .set::<_, _, ()>(key, value)
            .await
            .map_err(|e| IngestError::store_write(StoreCommand::Set, key, e))
    }

    async fn sadd(&mut self, key: &str, member: &str) -> Result<()> {
        debug!("Store SADD: {} {}", key, member);
        self.conn
            .sadd::<_, _, ()>(key, member)
            .await
            .map_err(|e| IngestError::store_write(StoreCommand::Sadd, key, e))
    }

    async fn lpush(&mut self, key: &str, value: &str) -> Result<()> {
        debug!("Store LPUSH: {} {}", key, value);
        self.conn
            .lpush::<_, _, ()>(key, value)
            .await
            .map_err(|e| IngestError::store_write(StoreCommand::Lpush, key, e))
    }

    async fn incr(&mut self, key: &str) -> Result<i64> {
        debug!("Store INCR: {}", key);
        self.conn
            .incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| IngestError::store_write(StoreCommand::Incr, key, e))
    }

    async fn ping(&mut self) -> Result<()> {
        redis::cmd("PING")
            .query_async::<String>(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(|e| IngestError::store_write(StoreCommand::Ping, "", e))
    }
}
