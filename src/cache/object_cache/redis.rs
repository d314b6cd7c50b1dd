use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use crate::cache::traits::{AtomicCounter, CacheResult, CacheTier, ObjectCache};
use crate::declare_cache_plugin;
use crate::errors::{LinkpressError, Result};
use crate::storage::UrlRecord;

declare_cache_plugin!("redis", RedisCache);

/// Redis 缓存层
///
/// 记录以 JSON 字符串保存；计数器直接用 INCR / PEXPIRE / SET NX，
/// 多个实例共享同一个计数器时依然保证短码唯一。
pub struct RedisCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisCache {
    pub fn new(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            LinkpressError::cache_connection(format!("Invalid Redis URL '{}': {}", url, e))
        })?;

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        })
    }

    /// 按配置创建并 PING 一次，启动阶段就暴露连接问题
    pub async fn from_config() -> Result<Self> {
        let config = crate::config::get_config();
        let redis_config = &config.cache.redis;

        let cache = Self::new(&redis_config.url, &redis_config.key_prefix)?;
        let mut conn = cache.get_connection().await.map_err(|e| {
            error!(
                "Failed to connect to Redis: {}. Check Redis server status and URL: {}",
                e, redis_config.url
            );
            LinkpressError::from(e)
        })?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!(
            "RedisCache ready (prefix: '{}', ping: {})",
            redis_config.key_prefix, pong
        );

        Ok(cache)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    /// 连接层错误时丢弃缓存的连接，下次重新建立
    async fn handle_error(&self, err: redis::RedisError) -> LinkpressError {
        if err.is_connection_dropped() || err.is_io_error() || err.is_timeout() {
            self.reset_connection().await;
        }
        LinkpressError::from(err)
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ObjectCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult {
        let redis_key = self.make_key(key);

        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to get Redis connection: {}", e);
                self.reset_connection().await;
                return CacheResult::Miss;
            }
        };

        let result: redis::RedisResult<Option<String>> = conn.get(&redis_key).await;

        match result {
            Ok(Some(data)) => match serde_json::from_str::<UrlRecord>(&data) {
                Ok(record) => {
                    trace!("Redis cache hit: {}", key);
                    CacheResult::Found(record)
                }
                Err(e) => {
                    error!("Failed to deserialize UrlRecord for key '{}': {}", key, e);
                    CacheResult::Miss
                }
            },
            Ok(None) => {
                trace!("Redis cache miss: {}", key);
                CacheResult::Miss
            }
            Err(e) => {
                error!("Failed to get key '{}': {}", key, e);
                self.handle_error(e).await;
                CacheResult::Miss
            }
        }
    }

    async fn insert(&self, key: &str, value: &UrlRecord, ttl: Duration) -> Result<()> {
        let redis_key = self.make_key(key);
        let payload = serde_json::to_string(value)?;

        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => return Err(self.handle_error(e).await),
        };

        let ttl_secs = ttl.as_secs().max(1);
        if let Err(e) = conn
            .set_ex::<String, String, ()>(redis_key, payload, ttl_secs)
            .await
        {
            return Err(self.handle_error(e).await);
        }

        trace!("Inserted key into Redis cache: {}", key);
        Ok(())
    }
}

#[async_trait]
impl AtomicCounter for RedisCache {
    async fn increment(&self, key: &str) -> Result<i64> {
        let redis_key = self.make_key(key);
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => return Err(self.handle_error(e).await),
        };

        match conn.incr::<String, i64, i64>(redis_key, 1).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.handle_error(e).await),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let redis_key = self.make_key(key);
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => return Err(self.handle_error(e).await),
        };

        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        match conn.pexpire::<String, bool>(redis_key, millis).await {
            Ok(_) => Ok(()),
            Err(e) => Err(self.handle_error(e).await),
        }
    }

    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        let redis_key = self.make_key(key);
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => return Err(self.handle_error(e).await),
        };

        match conn.set_nx::<String, i64, bool>(redis_key, value).await {
            Ok(written) => Ok(written),
            Err(e) => Err(self.handle_error(e).await),
        }
    }
}

impl CacheTier for RedisCache {
    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key_applies_prefix() {
        let cache = RedisCache::new("redis://127.0.0.1:6379/", "linkpress:").unwrap();
        assert_eq!(cache.make_key("counter"), "linkpress:counter");
        assert_eq!(cache.make_key("https://www.a.com"), "linkpress:https://www.a.com");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = RedisCache::new("not a url", "lp:").err().unwrap();
        assert!(matches!(err, LinkpressError::CacheConnection(_)));
    }
}
