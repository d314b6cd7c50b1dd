//! Read operations for SeaOrmStorage

use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use super::converters::model_to_record;
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkpressError, Result};
use crate::storage::UrlRecord;
use crate::utils::decode_base62;

use migration::entities::url;

impl SeaOrmStorage {
    pub(super) async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("get_by_short_code({})", code),
            self.retry_config,
            || async {
                url::Entity::find()
                    .filter(url::Column::ShortCode.eq(code))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LinkpressError::database_operation(format!("Failed to query short code {}: {}", code, e))
        })?;

        Ok(model.map(model_to_record))
    }

    pub(super) async fn find_latest_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>> {
        let db = &self.db;

        let model = retry::with_retry("get_by_original_url", self.retry_config, || async {
            url::Entity::find()
                .filter(url::Column::OriginalUrl.eq(original_url))
                .order_by_desc(url::Column::Id)
                .one(db)
                .await
        })
        .await
        .map_err(|e| {
            LinkpressError::database_operation(format!(
                "Failed to query original URL {}: {}",
                original_url, e
            ))
        })?;

        Ok(model.map(model_to_record))
    }

    pub(super) async fn find_max_id(&self) -> Result<i64> {
        let db = &self.db;

        let max_id = retry::with_retry("max_id", self.retry_config, || async {
            url::Entity::find()
                .select_only()
                .column(url::Column::Id)
                .order_by_desc(url::Column::Id)
                .into_tuple::<i64>()
                .one(db)
                .await
        })
        .await?;

        Ok(max_id.unwrap_or(0))
    }

    /// 只取 short_code 一列，在应用层解码；无法解码的短码忽略
    pub(super) async fn find_max_code_value(&self) -> Result<u64> {
        let codes = url::Entity::find()
            .select_only()
            .column(url::Column::ShortCode)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;

        let max = codes
            .iter()
            .filter_map(|code| decode_base62(code))
            .max()
            .unwrap_or(0);
        debug!("Max short code value across {} records: {}", codes.len(), max);
        Ok(max)
    }

    /// 只取 original_url 一列，过滤器预热用
    pub(super) async fn find_active_original_urls(&self) -> Result<Vec<String>> {
        let now = Utc::now();

        let urls = url::Entity::find()
            .select_only()
            .column(url::Column::OriginalUrl)
            .filter(
                Condition::any()
                    .add(url::Column::ExpiresAt.is_null())
                    .add(url::Column::ExpiresAt.gt(now)),
            )
            .into_tuple::<String>()
            .all(&self.db)
            .await?;

        info!("Loaded {} active original URLs", urls.len());
        Ok(urls)
    }

    pub(super) async fn count_records(&self) -> Result<u64> {
        let count = url::Entity::find().count(&self.db).await?;
        debug!("URL record count: {}", count);
        Ok(count)
    }
}
