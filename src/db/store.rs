use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::error::AppResult;

/// Named text slots the rating collection is persisted into
///
/// The engine only ever uses one slot; the key is passed in so the same store can be
/// shared between environments or users.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SlotStore: Send + Sync {
    /// Reads a slot; `None` when it has never been written
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Overwrites a slot
    async fn set(&self, key: &str, value: String) -> AppResult<()>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Process-local store, used in tests and when no Redis is configured
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one slot
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.into(), value.into());
        Self {
            slots: Arc::new(RwLock::new(slots)),
        }
    }
}

#[async_trait::async_trait]
impl SlotStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.slots.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
