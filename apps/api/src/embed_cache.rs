//! Embedding cache — memoizes embedding vectors in Redis by content hash.
//!
//! Key scheme: `"emb:" + hex(sha256(text))`, value is the JSON-encoded
//! `Vec<f32>`, expiry 24 hours from write. A hit is always preferred over
//! recomputation; callers tolerate eventually-stale vectors across
//! embedding-model changes. Concurrent misses for the same text may both
//! call the provider and both write; last write wins.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::EmbeddingClient;

pub const EMBEDDING_TTL_SECS: u64 = 60 * 60 * 24;

const KEY_PREFIX: &str = "emb:";

/// Byte-string key-value store with per-key expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_secs: u64) -> anyhow::Result<()>;
}

/// Redis-backed implementation used in production.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_secs: u64) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmbedCache {
    store: Arc<dyn CacheStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl EmbedCache {
    pub fn new(store: Arc<dyn CacheStore>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedder }
    }

    /// Returns the embedding for `text`, from cache when present and
    /// unexpired, otherwise from the provider (which owns retries).
    pub async fn get_embedding(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let key = cache_key(text);

        match self.store.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<f32>>(&bytes) {
                Ok(vector) => {
                    debug!("embedding cache hit for {key}");
                    return Ok(vector);
                }
                // Undecodable entry is treated as a miss and overwritten.
                Err(e) => warn!("discarding undecodable cache entry {key}: {e}"),
            },
            Ok(None) => {}
            Err(e) => return Err(AppError::Cache(e.to_string())),
        }

        let vector = self
            .embedder
            .embed(text)
            .await
            .map_err(|e| AppError::Llm(format!("임베딩 호출 실패: {e}")))?;

        let bytes = serde_json::to_vec(&vector)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode embedding: {e}")))?;
        self.store
            .set_with_expiry(&key, &bytes, EMBEDDING_TTL_SECS)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        Ok(vector)
    }
}

fn cache_key(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("{KEY_PREFIX}{digest:x}")
}
