//! URL shortening service
//!
//! Composes the validator, existence filter, cache tier and durable store into
//! the two public operations: [`UrlService::shorten`] and [`UrlService::resolve`].
//!
//! The store is authoritative. The cache and filter are populated in detached
//! background tasks after the store answers; their failures are logged and
//! never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::cache::{AtomicCounter, CacheResult, CacheTier, ExistenceFilter, ObjectCache};
use crate::config::StaticConfig;
use crate::errors::{LinkpressError, Result};
use crate::storage::{NewUrlRecord, UrlRecord, UrlStore};
use crate::utils::{encode_base62, normalize_url};

/// Cache key for a bare short code
pub fn code_cache_key(code: &str) -> String {
    format!("code:{}", code)
}

/// Cache key for a normalized original URL (dedup lookups)
pub fn url_cache_key(normalized: &str) -> String {
    format!("url:{}", normalized)
}

/// Tunables for [`UrlService`]
#[derive(Debug, Clone)]
pub struct UrlServiceOptions {
    /// Prefix prepended to short codes in shorten responses
    pub base_url: String,
    /// Lifetime of a newly created record
    pub link_ttl: chrono::Duration,
    /// How long a record stays in the cache tier
    pub cache_ttl: Duration,
    pub counter_key: String,
    pub max_create_attempts: u32,
}

impl UrlServiceOptions {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            base_url: config.server.public_base_url(),
            link_ttl: i64::try_from(config.links.ttl_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
            cache_ttl: Duration::from_secs(config.cache.default_ttl),
            counter_key: config.cache.counter_key.clone(),
            max_create_attempts: config.links.max_create_attempts.max(1),
        }
    }
}

impl Default for UrlServiceOptions {
    fn default() -> Self {
        Self::from_config(&StaticConfig::default())
    }
}

pub struct UrlService {
    store: Arc<dyn UrlStore>,
    cache: Arc<dyn CacheTier>,
    filter: Arc<dyn ExistenceFilter>,
    options: UrlServiceOptions,
}

impl UrlService {
    pub fn new(
        store: Arc<dyn UrlStore>,
        cache: Arc<dyn CacheTier>,
        filter: Arc<dyn ExistenceFilter>,
        options: UrlServiceOptions,
    ) -> Self {
        Self {
            store,
            cache,
            filter,
            options,
        }
    }

    pub fn options(&self) -> &UrlServiceOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<dyn UrlStore> {
        &self.store
    }

    /// Shorten `original_url`, reusing an active record for the same URL when
    /// one exists. The returned record's `short_code` is qualified with the
    /// base URL; nothing stored or cached ever carries that prefix.
    pub async fn shorten(&self, original_url: &str) -> Result<UrlRecord> {
        let normalized = normalize_url(original_url)?;

        if self.filter.contains(&normalized) {
            if let Some(existing) = self.find_existing(&normalized).await? {
                return Ok(existing.qualified(&self.options.base_url));
            }
            debug!("Existence filter false positive: {}", normalized);
        }

        let record = self.create_record(&normalized).await?;

        self.spawn_populate(
            vec![code_cache_key(&record.short_code), url_cache_key(&normalized)],
            record.clone(),
            Some(normalized),
        );

        Ok(record.qualified(&self.options.base_url))
    }

    /// Resolve a bare short code to its record.
    ///
    /// Expired records fail with `UrlExpired` whether they come from the cache
    /// or the store.
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord> {
        if let CacheResult::Found(record) = self.cache.get(&code_cache_key(code)).await {
            if record.is_expired() {
                info!("Cache hit but expired: {}", code);
                return Err(LinkpressError::url_expired(format!(
                    "Short code has expired: {}",
                    code
                )));
            }
            debug!("Cache hit: {}", code);
            return Ok(record);
        }
        debug!("Cache miss: {}", code);

        let record = self
            .store
            .get_by_short_code(code)
            .await?
            .ok_or_else(|| LinkpressError::url_not_found(format!("Short code not found: {}", code)))?;

        if record.is_expired() {
            return Err(LinkpressError::url_expired(format!(
                "Short code has expired: {}",
                code
            )));
        }

        self.spawn_populate(vec![code_cache_key(code)], record.clone(), None);
        Ok(record)
    }

    /// Dedup lookup after a positive filter check: cache first, then store.
    /// Expired hits count as misses so a fresh record gets created.
    async fn find_existing(&self, normalized: &str) -> Result<Option<UrlRecord>> {
        if let CacheResult::Found(record) = self.cache.get(&url_cache_key(normalized)).await {
            if !record.is_expired() {
                info!("Dedup cache hit: {}", normalized);
                return Ok(Some(record));
            }
            debug!("Dedup cache hit is expired: {}", normalized);
        }

        match self.store.get_by_original_url(normalized).await? {
            Some(record) if !record.is_expired() => {
                info!("Dedup store hit: {}", normalized);
                self.spawn_populate(vec![url_cache_key(normalized)], record.clone(), None);
                Ok(Some(record))
            }
            _ => Ok(None),
        }
    }

    /// Assign a code from the shared counter and persist the record.
    ///
    /// Only `AlreadyExists` is retried, with a fresh counter value each time.
    async fn create_record(&self, normalized: &str) -> Result<UrlRecord> {
        let max_attempts = self.options.max_create_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let counter = self.cache.increment(&self.options.counter_key).await?;
            let value = u64::try_from(counter).map_err(|_| {
                LinkpressError::internal(format!("Counter returned a negative value: {}", counter))
            })?;
            let short_code = encode_base62(value);

            let now = Utc::now();
            let new_record = NewUrlRecord {
                original_url: normalized.to_string(),
                short_code: short_code.clone(),
                expires_at: now.checked_add_signed(self.options.link_ttl),
            };

            match self.store.create_url(new_record).await {
                Ok(record) => {
                    info!("Shortened {} -> {}", normalized, record.short_code);
                    return Ok(record);
                }
                Err(LinkpressError::AlreadyExists(msg)) if attempt < max_attempts => {
                    warn!(
                        "Short code collision (attempt {}/{}): {}",
                        attempt, max_attempts, msg
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Detached best-effort cache and filter population
    fn spawn_populate(&self, keys: Vec<String>, record: UrlRecord, filter_key: Option<String>) {
        let cache = Arc::clone(&self.cache);
        let filter = Arc::clone(&self.filter);
        let ttl = self.options.cache_ttl;

        tokio::spawn(async move {
            for key in keys {
                if let Err(e) = cache.insert(&key, &record, ttl).await {
                    error!("Failed to populate cache for key '{}': {}", key, e);
                }
            }
            if let Some(key) = filter_key {
                filter.add(&key);
            }
        });
    }
}
