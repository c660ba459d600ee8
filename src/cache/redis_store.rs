use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::KeyValueStore;
use crate::config;
use crate::error::Result;

const KEY_PREFIX: &str = "klinesignal:";

/// Redis-backed store shared by every process pointing at the same server
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect using `REDIS_URL`
    pub async fn new() -> Result<Self> {
        Self::connect(&config::get_redis_url()).await
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(format!("{}{}", KEY_PREFIX, key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set(format!("{}{}", KEY_PREFIX, key), value).await?;
        Ok(())
    }
}
