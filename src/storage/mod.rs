use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{NewUrlRecord, UrlRecord};

/// 持久化存储契约，记录的唯一事实来源
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// 写入新记录，分配 id 和 created_at。
    /// 短码冲突时返回 `AlreadyExists`。
    async fn create_url(&self, record: NewUrlRecord) -> Result<UrlRecord>;

    async fn get_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>>;

    /// 同一个 URL 可能有多条记录（旧记录过期后重新生成），返回最新的一条
    async fn get_by_original_url(&self, original_url: &str) -> Result<Option<UrlRecord>>;

    /// 当前最大 id，表为空时返回 0
    async fn max_id(&self) -> Result<i64>;

    /// 所有短码按 base62 解码后的最大值，表为空时返回 0。
    /// 计数器值在写入失败或冲突重试时会被消耗，所以它可能大于 `max_id`。
    async fn max_code_value(&self) -> Result<u64>;

    /// 所有未过期记录的原始 URL（启动时预热过滤器）
    async fn load_active_original_urls(&self) -> Result<Vec<String>>;

    async fn count(&self) -> Result<u64>;

    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
