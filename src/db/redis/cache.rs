use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

const SEARCH_TTL: u64 = 3600; // 1 hour
const MOVIE_TTL: u64 = 86400; // 1 day
const GENRE_LIST_TTL: u64 = 604800; // 1 week
const DISCOVER_TTL: u64 = 21600; // 6 hours

/// Keys for cached metadata lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Raw TMDB titles for a suggestion query
    TitleSearch(String),
    /// Resolved metadata for a rated title
    MovieDetails(String),
    /// TMDB genre id → name table
    GenreList,
    /// Popular titles for a genre id above a minimum vote average (one decimal)
    Discover { genre_id: u32, min_rating: String },
}

impl CacheKey {
    /// Seconds a cached value stays valid
    pub fn ttl(&self) -> u64 {
        match self {
            CacheKey::TitleSearch(_) => SEARCH_TTL,
            CacheKey::MovieDetails(_) => MOVIE_TTL,
            CacheKey::GenreList => GENRE_LIST_TTL,
            CacheKey::Discover { .. } => DISCOVER_TTL,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::TitleSearch(query) => write!(f, "search:{}", query.trim().to_lowercase()),
            CacheKey::MovieDetails(title) => write!(f, "movie:{}", title.trim().to_lowercase()),
            CacheKey::GenreList => write!(f, "genres:movie"),
            CacheKey::Discover {
                genre_id,
                min_rating,
            } => write!(f, "discover:{}:{}", genre_id, min_rating),
        }
    }
}

/// Creates a Redis client
///
/// Opening does not connect; connections are made lazily per command.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Pending write handed to the background writer
struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for metadata lookups
///
/// Reads go straight to Redis; writes are queued and applied by a background task so a
/// slow Redis never delays a lookup response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Handle for stopping the background writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Stops the writer once every queued write has been attempted
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task; requires a tokio runtime
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(Self::run_writer(client, write_rx, shutdown_rx));

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    async fn run_writer(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer started");
        let mut failed = 0usize;

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    if let Err(e) = Self::apply(&client, write).await {
                        failed += 1;
                        tracing::error!(error = %e, "Failed to write lookup cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Drain whatever was queued before the signal
                    write_rx.close();
                    while let Some(write) = write_rx.recv().await {
                        if let Err(e) = Self::apply(&client, write).await {
                            failed += 1;
                            tracing::error!(error = %e, "Failed to flush lookup cache");
                        }
                    }
                    tracing::info!(failed_writes = failed, "Cache writer drained");
                    break;
                }
                else => break,
            }
        }
    }

    async fn apply(client: &Client, write: PendingWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(write.key, write.value, write.ttl).await?;
        Ok(())
    }

    /// Cached value for `key`, or `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Codec(format!("Cache deserialization error for {}: {}", key, e))
                })
            })
            .transpose()
    }

    /// Like [`Cache::get_from_cache`] but treats any cache failure as a miss
    pub async fn lookup<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.get_from_cache(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Queues a write without waiting for it; uses the key's TTL
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value: json,
            ttl: key.ttl(),
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer already stopped, dropping write");
        }
    }
}
