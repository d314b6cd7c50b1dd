pub mod existence_filter;
pub mod macros;
pub mod object_cache;
pub mod register;
pub mod traits;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::get_config;
use crate::errors::{LinkpressError, Result};

pub use existence_filter::{BloomExistenceFilter, NullExistenceFilter};
pub use object_cache::{MemoryCache, RedisCache};
pub use traits::{AtomicCounter, CacheResult, CacheTier, ExistenceFilter, ObjectCache};

/// 按配置创建缓存层
pub async fn create_cache_tier() -> Result<Arc<dyn CacheTier>> {
    let config = get_config();
    let name = config.cache.cache_type.as_str();

    register::debug_cache_registry();

    let ctor = register::get_cache_plugin(name).ok_or_else(|| {
        LinkpressError::cache_plugin_not_found(format!("Unknown cache type: {}", name))
    })?;
    let cache = ctor().await?;
    info!("Cache tier initialized: {}", cache.backend_name());
    Ok(cache)
}

/// 按配置创建存在性过滤器，`filter.enabled = false` 时使用 null 实现
pub async fn create_existence_filter() -> Result<Arc<dyn ExistenceFilter>> {
    let config = get_config();
    let name = if config.filter.enabled { "bloom" } else { "null" };

    let ctor = register::get_filter_plugin(name).ok_or_else(|| {
        LinkpressError::cache_plugin_not_found(format!("Unknown existence filter: {}", name))
    })?;
    let filter = ctor().await?;
    debug!("Existence filter initialized: {}", name);
    Ok(filter)
}
