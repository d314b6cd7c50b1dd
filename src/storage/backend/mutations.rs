//! Write operations for SeaOrmStorage

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DbErr, SqlErr};
use tracing::{debug, warn};

use super::converters::{model_to_record, new_record_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkpressError, Result};
use crate::storage::{NewUrlRecord, UrlRecord};

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl SeaOrmStorage {
    pub(super) async fn insert_record(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        let db = &self.db;
        let created_at = Utc::now();

        let result = retry::with_retry(
            &format!("create_url({})", record.short_code),
            self.retry_config,
            || async {
                new_record_to_active_model(&record, created_at)
                    .insert(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(model) => {
                debug!("URL record created: {} -> {}", model.short_code, model.original_url);
                Ok(model_to_record(model))
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Short code collision on insert: {}", record.short_code);
                Err(LinkpressError::already_exists(format!(
                    "Short code already exists: {}",
                    record.short_code
                )))
            }
            Err(e) => Err(LinkpressError::database_operation(format!(
                "Failed to create URL record: {}",
                e
            ))),
        }
    }
}
