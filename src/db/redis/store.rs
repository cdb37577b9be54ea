use redis::{AsyncCommands, Client};

use crate::{db::SlotStore, error::AppResult};

/// Slot store backed by plain Redis string keys (no expiry)
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SlotStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(key, value).await?;
        tracing::debug!(slot = %key, "Slot written to Redis");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
