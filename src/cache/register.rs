use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::cache::traits::{CacheTier, ExistenceFilter};
use crate::errors::Result;

pub type BoxedExistenceFilterFuture =
    Pin<Box<dyn Future<Output = Result<Arc<dyn ExistenceFilter>>> + Send>>;
pub type ExistenceFilterConstructor = Arc<dyn Fn() -> BoxedExistenceFilterFuture + Send + Sync>;

pub type BoxedCacheFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn CacheTier>>> + Send>>;
pub type CacheConstructor = Arc<dyn Fn() -> BoxedCacheFuture + Send + Sync>;

static FILTER_REGISTRY: Lazy<RwLock<HashMap<String, ExistenceFilterConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static CACHE_REGISTRY: Lazy<RwLock<HashMap<String, CacheConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_filter_plugin<S: Into<String>>(name: S, constructor: ExistenceFilterConstructor) {
    FILTER_REGISTRY.write().insert(name.into(), constructor);
}

pub fn get_filter_plugin(name: &str) -> Option<ExistenceFilterConstructor> {
    FILTER_REGISTRY.read().get(name).cloned()
}

pub fn register_cache_plugin<S: Into<String>>(name: S, constructor: CacheConstructor) {
    CACHE_REGISTRY.write().insert(name.into(), constructor);
}

pub fn get_cache_plugin(name: &str) -> Option<CacheConstructor> {
    CACHE_REGISTRY.read().get(name).cloned()
}

pub fn debug_cache_registry() {
    let filters = FILTER_REGISTRY.read();
    if filters.is_empty() {
        tracing::debug!("No existence filter plugins registered.");
    } else {
        tracing::debug!("Registered existence filter plugins:");
        for key in filters.keys() {
            tracing::debug!(" - {}", key);
        }
    }

    let caches = CACHE_REGISTRY.read();
    if caches.is_empty() {
        tracing::debug!("No cache plugins registered.");
    } else {
        tracing::debug!("Registered cache plugins:");
        for key in caches.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::existence_filter::NullExistenceFilter;

    #[test]
    fn test_register_and_lookup_filter() {
        register_filter_plugin(
            "test-null",
            Arc::new(|| -> BoxedExistenceFilterFuture {
                Box::pin(async {
                    Ok::<_, crate::errors::LinkpressError>(
                        Arc::new(NullExistenceFilter) as Arc<dyn ExistenceFilter>
                    )
                })
            }),
        );
        assert!(get_filter_plugin("test-null").is_some());
        assert!(get_filter_plugin("does-not-exist").is_none());
    }
}
