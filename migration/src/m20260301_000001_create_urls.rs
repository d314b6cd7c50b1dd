use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 urls 表，id 由数据库分配
        manager
            .create_table(
                Table::create()
                    .table(Urls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Urls::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Urls::ShortCode)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Urls::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(Urls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // original_url 是去重查询的 key
        match manager.get_database_backend() {
            DatabaseBackend::MySql => {
                // MySQL 的 TEXT 列只能建前缀索引
                manager
                    .get_connection()
                    .execute_unprepared(
                        "CREATE INDEX idx_urls_original_url ON urls (original_url(255))",
                    )
                    .await
                    .ok(); // 忽略错误（索引可能已存在）
            }
            _ => {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name("idx_urls_original_url")
                            .table(Urls::Table)
                            .col(Urls::OriginalUrl)
                            .to_owned(),
                    )
                    .await?;
            }
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_expires_at")
                    .table(Urls::Table)
                    .col(Urls::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Urls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Urls {
    Table,
    Id,
    ShortCode,
    OriginalUrl,
    CreatedAt,
    ExpiresAt,
}
