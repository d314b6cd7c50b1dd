//! 启动流程测试：计数器推进和过滤器预热

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};

use common::{MockStore, bare_code, build_harness, sqlite_storage, test_options};
use linkpress::cache::{AtomicCounter, BloomExistenceFilter, ExistenceFilter, MemoryCache};
use linkpress::runtime::lifetime::startup::{seed_counter, warm_filter};
use linkpress::services::UrlService;
use linkpress::storage::{NewUrlRecord, UrlStore};

#[tokio::test]
async fn test_seed_counter_starts_after_existing_ids() {
    let (storage, _dir) = sqlite_storage().await;
    for code in ["a", "b", "c"] {
        storage
            .create_url(NewUrlRecord {
                original_url: format!("https://www.{}-site.com", code),
                short_code: code.to_string(),
                expires_at: None,
            })
            .await
            .unwrap();
    }
    let max_id = storage.max_id().await.unwrap();

    let cache = MemoryCache::new();
    assert!(seed_counter(storage.as_ref(), &cache, "counter").await.unwrap());
    assert_eq!(cache.increment("counter").await.unwrap(), max_id + 1);
}

#[tokio::test]
async fn test_seed_counter_keeps_existing_value() {
    let (storage, _dir) = sqlite_storage().await;
    let cache = MemoryCache::new();

    // 其他实例已经推进过计数器
    for _ in 0..10 {
        cache.increment("counter").await.unwrap();
    }

    assert!(!seed_counter(storage.as_ref(), &cache, "counter").await.unwrap());
    assert_eq!(cache.increment("counter").await.unwrap(), 11);
}

#[tokio::test]
async fn test_seed_counter_skips_codes_consumed_by_failed_writes() {
    let store = Arc::new(MockStore::new());
    let h = build_harness(store.clone(), test_options());

    // 写入失败也会消耗计数值 1..=3
    store.fail_writes.store(true, Ordering::SeqCst);
    for i in 0..3 {
        assert!(h.service.shorten(&format!("lost{}.com", i)).await.is_err());
    }
    store.fail_writes.store(false, Ordering::SeqCst);
    for i in 0..5 {
        h.service.shorten(&format!("kept{}.com", i)).await.unwrap();
    }
    assert_eq!(store.max_id().await.unwrap(), 5);
    assert_eq!(store.max_code_value().await.unwrap(), 8);

    // 重启：新的内存缓存层
    let cache = Arc::new(MemoryCache::new());
    let key = test_options().counter_key;
    assert!(seed_counter(store.as_ref(), cache.as_ref(), &key).await.unwrap());

    let filter = Arc::new(BloomExistenceFilter::new(1_000_000, 3).unwrap());
    let service = UrlService::new(store.clone(), cache, filter, test_options());
    let record = service.shorten("fresh.com").await.unwrap();

    assert_eq!(bare_code(&record.short_code), "9");
    assert_eq!(store.len().await, 6);
}

#[tokio::test]
async fn test_warm_filter_loads_active_urls() {
    let (storage, _dir) = sqlite_storage().await;
    storage
        .create_url(NewUrlRecord {
            original_url: "https://www.live.com".to_string(),
            short_code: "l".to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
        .await
        .unwrap();
    storage
        .create_url(NewUrlRecord {
            original_url: "https://www.dead.com".to_string(),
            short_code: "d".to_string(),
            expires_at: Some(Utc::now() - Duration::hours(1)),
        })
        .await
        .unwrap();

    let filter = BloomExistenceFilter::new(1_000_000, 3).unwrap();
    let loaded = warm_filter(storage.as_ref(), &filter).await.unwrap();

    assert_eq!(loaded, 1);
    assert!(filter.contains("https://www.live.com"));
}
