use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use moka::future::Cache;
use moka::policy::Expiry;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::traits::{AtomicCounter, CacheResult, CacheTier, ObjectCache};
use crate::declare_cache_plugin;
use crate::errors::Result;
use crate::storage::UrlRecord;

declare_cache_plugin!("memory", MemoryCache);

const DEFAULT_MAX_CAPACITY: u64 = 10_000;
const COUNTER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// 已过期的记录仍短暂保留，让解析直接在缓存层返回过期
const EXPIRED_RECORD_TTL: Duration = Duration::from_secs(1);

#[derive(Clone)]
struct CachedRecord {
    record: UrlRecord,
    ttl: Duration,
}

/// 缓存时长取写入 TTL 与记录剩余有效期的较小值
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(value: &CachedRecord) -> Duration {
        match value.record.expires_at {
            Some(expires_at) => (expires_at - Utc::now())
                .to_std()
                .unwrap_or(EXPIRED_RECORD_TTL)
                .min(value.ttl),
            None => value.ttl,
        }
    }
}

impl Expiry<String, CachedRecord> for RecordExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedRecord,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Self::remaining(value))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedRecord,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::remaining(value))
    }
}

struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// 进程内缓存层
///
/// 记录存放在 moka 中，容量和过期由 moka 负责淘汰。
/// 计数器的原子性由 DashMap 的分片写锁保证：`entry()` 持有分片锁直到修改完成；
/// 过期的窗口计数器按 `sweep_interval` 周期性清理。
pub struct MemoryCache {
    records: Cache<String, CachedRecord>,
    counters: DashMap<String, Counter>,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let records = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(RecordExpiry)
            .build();

        Self {
            records,
            counters: DashMap::new(),
            sweep_interval: COUNTER_SWEEP_INTERVAL,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn with_counter_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub async fn from_config() -> Result<Self> {
        let config = crate::config::get_config();
        let max_capacity = config.cache.memory.max_capacity;

        debug!(
            "MemoryCache initialized with max capacity: {}",
            max_capacity
        );
        Ok(Self::with_capacity(max_capacity))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// 先执行 moka 的挂起维护任务，结果才是准确的
    pub async fn entry_count(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }

    pub fn counter_count(&self) -> usize {
        self.counters.len()
    }

    /// 删除所有已过期的窗口计数器，返回删除数量
    pub fn purge_expired_counters(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.counters.retain(|_, counter| {
            let live = counter.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    fn maybe_sweep(&self, now: Instant) {
        {
            let mut last = self.last_sweep.lock();
            if now.saturating_duration_since(*last) < self.sweep_interval {
                return;
            }
            *last = now;
        }

        let removed = self.purge_expired_counters();
        if removed > 0 {
            trace!("Purged {} expired counters", removed);
        }
    }
}

#[async_trait]
impl ObjectCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult {
        match self.records.get(key).await {
            Some(cached) => {
                trace!("Memory cache hit: {}", key);
                CacheResult::Found(cached.record)
            }
            None => CacheResult::Miss,
        }
    }

    async fn insert(&self, key: &str, value: &UrlRecord, ttl: Duration) -> Result<()> {
        self.records
            .insert(
                key.to_string(),
                CachedRecord {
                    record: value.clone(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}

#[async_trait]
impl AtomicCounter for MemoryCache {
    async fn increment(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        // 必须在拿到 entry 之前清理，retain 需要所有分片锁
        self.maybe_sweep(now);

        let mut counter = self.counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if !counter.is_live(now) {
            counter.value = 0;
            counter.expires_at = None;
        }
        counter.value += 1;
        Ok(counter.value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        if let Some(mut counter) = self.counters.get_mut(key) {
            counter.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        let now = Instant::now();
        match self.counters.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                occupied.insert(Counter {
                    value,
                    expires_at: None,
                });
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Counter {
                    value,
                    expires_at: None,
                });
                Ok(true)
            }
        }
    }
}

impl CacheTier for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
