use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{LinkpressError, Result};
use crate::storage::UrlRecord;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    /// 命中缓存
    Found(UrlRecord),
    /// 未命中（包括后端不可用，调用方继续回源）
    Miss,
}

impl CacheResult {
    pub fn into_option(self) -> Option<UrlRecord> {
        match self {
            CacheResult::Found(record) => Some(record),
            CacheResult::Miss => None,
        }
    }
}

/// 概率型存在性过滤器
///
/// - `contains == false` 表示**一定没有**加入过
/// - `contains == true` 表示**可能**加入过，调用方需要回源确认
///
/// 只增不减，生命周期与进程相同。
pub trait ExistenceFilter: Send + Sync {
    fn contains(&self, key: &str) -> bool;

    fn add(&self, key: &str);

    /// 批量加入（启动预热）
    fn add_all(&self, keys: &[String]) {
        for key in keys {
            self.add(key);
        }
    }
}

/// 短链记录缓存
#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult;

    async fn insert(&self, key: &str, value: &UrlRecord, ttl: Duration) -> Result<()>;
}

/// 原子计数器
///
/// 短码唯一性完全依赖 `increment` 的原子性。
#[async_trait]
pub trait AtomicCounter: Send + Sync {
    /// 原子自增并返回自增后的值；key 不存在时从 0 开始
    async fn increment(&self, key: &str) -> Result<i64>;

    /// 为计数器设置过期时间
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// key 不存在时写入初始值，返回是否写入
    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool>;

    /// 固定窗口限流：计数一次，超过 `limit` 返回 `RateLimitExceeded`。
    ///
    /// 窗口内第一次计数时设置过期时间，key 过期即开始新窗口。
    async fn allow(&self, key: &str, limit: i64, window: Duration) -> Result<()> {
        let count = self.increment(key).await?;
        if count == 1 {
            self.expire(key, window).await?;
        }

        tracing::trace!("Rate limit counter {} = {}/{}", key, count, limit);

        if count > limit {
            return Err(LinkpressError::rate_limit_exceeded(format!(
                "Rate limit exceeded for {}",
                key
            )));
        }
        Ok(())
    }
}

/// 缓存层：记录缓存 + 原子计数器
pub trait CacheTier: ObjectCache + AtomicCounter {
    fn backend_name(&self) -> &'static str;
}
