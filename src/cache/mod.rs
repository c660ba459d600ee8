//! Minimal key-value persistence behind the endpoint pool's cached bases

pub mod file;
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// String store with last-writer-wins semantics
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
