use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cache::{self, AtomicCounter, CacheTier, ExistenceFilter};
use crate::config::get_config;
use crate::services::{RateLimiter, UrlService, UrlServiceOptions};
use crate::storage::{SeaOrmStorage, StorageFactory, UrlStore};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub cache: Arc<dyn CacheTier>,
    pub url_service: Arc<UrlService>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// 把共享计数器推进到已用短码与已有 id 中的较大者之后。
///
/// 只在 key 不存在时写入：多实例共享 redis 时，先启动的实例已经推进过的值不会被覆盖。
pub async fn seed_counter(
    store: &dyn UrlStore,
    counter: &dyn AtomicCounter,
    key: &str,
) -> crate::errors::Result<bool> {
    let max_id = store.max_id().await?;
    let max_code = i64::try_from(store.max_code_value().await?).unwrap_or(i64::MAX);
    let start = max_id.max(max_code);

    let seeded = counter.set_if_absent(key, start).await?;
    if seeded {
        info!(
            "Code counter '{}' seeded at {} (max id {}, max code {})",
            key, start, max_id, max_code
        );
    } else {
        debug!("Code counter '{}' already present, left untouched", key);
    }
    Ok(seeded)
}

/// 用所有未过期记录的原始 URL 预热存在性过滤器，返回加载数量
pub async fn warm_filter(
    store: &dyn UrlStore,
    filter: &dyn ExistenceFilter,
) -> crate::errors::Result<usize> {
    let urls = store.load_active_original_urls().await?;
    filter.add_all(&urls);
    Ok(urls.len())
}

/// 准备服务器启动的上下文：存储、缓存、过滤器和业务服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let cache = cache::create_cache_tier()
        .await
        .context("Failed to create cache tier")?;
    info!("Using cache backend: {}", cache.backend_name());

    let filter = cache::create_existence_filter()
        .await
        .context("Failed to create existence filter")?;

    seed_counter(storage.as_ref(), cache.as_ref(), &config.cache.counter_key)
        .await
        .context("Failed to seed code counter")?;

    match warm_filter(storage.as_ref(), filter.as_ref()).await {
        Ok(count) => info!("Existence filter warmed with {} URLs", count),
        // 过滤器只是优化，冷启动不影响正确性
        Err(e) => warn!("Failed to warm existence filter: {}", e),
    }

    let store: Arc<dyn UrlStore> = storage.clone();
    let url_service = Arc::new(UrlService::new(
        store,
        cache.clone(),
        filter,
        UrlServiceOptions::from_config(&config),
    ));

    let counter: Arc<dyn AtomicCounter> = cache.clone();
    let rate_limiter = Arc::new(RateLimiter::from_config(counter, &config.rate_limit));
    if rate_limiter.is_enabled() {
        info!(
            "Rate limiting enabled: {} requests per {}s",
            config.rate_limit.limit, config.rate_limit.window_secs
        );
    } else {
        warn!("Rate limiting is disabled");
    }

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        cache,
        url_service,
        rate_limiter,
    })
}
