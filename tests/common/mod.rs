//! 集成测试共用的辅助工具
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;
use tokio::sync::RwLock;

use linkpress::cache::{
    AtomicCounter, BloomExistenceFilter, CacheResult, CacheTier, MemoryCache, ObjectCache,
};
use linkpress::errors::{LinkpressError, Result};
use linkpress::services::{UrlService, UrlServiceOptions};
use linkpress::storage::backend::{RetryConfig, SeaOrmStorage};
use linkpress::storage::{NewUrlRecord, UrlRecord, UrlStore};
use linkpress::utils::decode_base62;

pub const BASE_URL: &str = "https://lp.test";

/// 内存版 UrlStore，可注入故障
#[derive(Default)]
pub struct MockStore {
    records: RwLock<Vec<UrlRecord>>,
    /// 接下来多少次 create_url 返回短码冲突
    pub collisions: AtomicU32,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub create_calls: AtomicU32,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入一条记录（绕过 create_url 的计数与故障注入）
    pub async fn seed(
        &self,
        original_url: &str,
        short_code: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> UrlRecord {
        let mut records = self.records.write().await;
        let record = UrlRecord {
            id: records.len() as i64 + 1,
            original_url: original_url.to_string(),
            short_code: short_code.to_string(),
            created_at: Utc::now(),
            expires_at,
        };
        records.push(record.clone());
        record
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LinkpressError::database_connection("store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UrlStore for MockStore {
    async fn create_url(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LinkpressError::database_operation("insert failed"));
        }
        if self
            .collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(LinkpressError::already_exists(record.short_code));
        }

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.short_code == record.short_code) {
            return Err(LinkpressError::already_exists(record.short_code));
        }
        let stored = UrlRecord {
            id: records.len() as i64 + 1,
            original_url: record.original_url,
            short_code: record.short_code,
            created_at: Utc::now(),
            expires_at: record.expires_at,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        self.check_reads()?;
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.short_code == code).cloned())
    }

    async fn get_by_original_url(&self, original_url: &str) -> Result<Option<UrlRecord>> {
        self.check_reads()?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .find(|r| r.original_url == original_url)
            .cloned())
    }

    async fn max_id(&self) -> Result<i64> {
        self.check_reads()?;
        Ok(self.records.read().await.iter().map(|r| r.id).max().unwrap_or(0))
    }

    async fn max_code_value(&self) -> Result<u64> {
        self.check_reads()?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter_map(|r| decode_base62(&r.short_code))
            .max()
            .unwrap_or(0))
    }

    async fn load_active_original_urls(&self) -> Result<Vec<String>> {
        self.check_reads()?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| !r.is_expired())
            .map(|r| r.original_url.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        self.check_reads()?;
        Ok(self.records.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<()> {
        self.check_reads()
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// 记录缓存永远写入失败、读取未命中；计数器正常工作
#[derive(Default)]
pub struct FailingCache {
    counters: MemoryCache,
    pub insert_attempts: AtomicU32,
}

#[async_trait]
impl ObjectCache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult {
        CacheResult::Miss
    }

    async fn insert(&self, _key: &str, _value: &UrlRecord, _ttl: Duration) -> Result<()> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        Err(LinkpressError::cache_operation("cache write rejected"))
    }
}

#[async_trait]
impl AtomicCounter for FailingCache {
    async fn increment(&self, key: &str) -> Result<i64> {
        self.counters.increment(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        self.counters.expire(key, ttl).await
    }

    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        self.counters.set_if_absent(key, value).await
    }
}

impl CacheTier for FailingCache {
    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

pub fn test_options() -> UrlServiceOptions {
    UrlServiceOptions {
        base_url: BASE_URL.to_string(),
        ..UrlServiceOptions::default()
    }
}

/// 测试用服务组合，保留各组件的句柄以便断言
pub struct Harness<S> {
    pub store: Arc<S>,
    pub cache: Arc<MemoryCache>,
    pub filter: Arc<BloomExistenceFilter>,
    pub service: Arc<UrlService>,
}

pub fn build_harness<S: UrlStore + 'static>(store: Arc<S>, options: UrlServiceOptions) -> Harness<S> {
    let cache = Arc::new(MemoryCache::new());
    let filter = Arc::new(BloomExistenceFilter::new(1_000_000, 3).expect("bloom filter"));
    let service = Arc::new(UrlService::new(
        store.clone(),
        cache.clone(),
        filter.clone(),
        options,
    ));
    Harness {
        store,
        cache,
        filter,
        service,
    }
}

/// 临时目录中的 SQLite 存储，TempDir 需要和存储一起保活
pub async fn sqlite_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("linkpress_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::connect(&db_url, "sqlite", RetryConfig::default())
        .await
        .expect("Failed to create storage");
    (Arc::new(storage), temp_dir)
}

/// 轮询直到条件成立，用于等待后台填充任务
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 1s");
}

/// 从带前缀的短链中取出裸短码
pub fn bare_code(qualified: &str) -> &str {
    qualified.rsplit('/').next().unwrap_or(qualified)
}
