//! SeaORM storage backend
//!
//! Persists URL records in SQLite, MySQL/MariaDB or PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{LinkpressError, Result};
use crate::storage::{NewUrlRecord, UrlRecord, UrlStore};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_record, new_record_to_active_model};
pub use retry::RetryConfig;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkpressError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based URL store
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移，重试参数取自全局配置
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        let config = crate::config::get_config();
        let retry_config = RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };
        Self::connect(database_url, backend_name, retry_config).await
    }

    pub async fn connect(
        database_url: &str,
        backend_name: &str,
        retry_config: RetryConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkpressError::database_config("database_url is empty"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl UrlStore for SeaOrmStorage {
    async fn create_url(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        self.insert_record(record).await
    }

    async fn get_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        self.find_by_short_code(code).await
    }

    async fn get_by_original_url(&self, original_url: &str) -> Result<Option<UrlRecord>> {
        self.find_latest_by_original_url(original_url).await
    }

    async fn max_id(&self) -> Result<i64> {
        self.find_max_id().await
    }

    async fn max_code_value(&self) -> Result<u64> {
        self.find_max_code_value().await
    }

    async fn load_active_original_urls(&self) -> Result<Vec<String>> {
        self.find_active_original_urls().await
    }

    async fn count(&self) -> Result<u64> {
        self.count_records().await
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(|e| {
            LinkpressError::database_connection(format!("Database ping failed: {}", e))
        })
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("urls.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite://data/urls.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mysql://u:p@localhost/lp").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/lp").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://u@localhost/lp").unwrap(),
            "postgres"
        );
    }

    #[test]
    fn test_infer_backend_unknown() {
        let err = infer_backend_from_url("mongodb://localhost").unwrap_err();
        assert!(matches!(err, LinkpressError::DatabaseConfig(_)));
    }
}
