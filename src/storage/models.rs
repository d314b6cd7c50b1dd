use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 短链记录
///
/// `short_code` 在存储和缓存中永远是裸短码；对外返回前由 [`UrlRecord::qualified`]
/// 生成带前缀的副本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    /// `None` 表示永不过期
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// 返回短码带上服务地址前缀的副本
    pub fn qualified(&self, base_url: &str) -> UrlRecord {
        UrlRecord {
            short_code: format!("{}/{}", base_url.trim_end_matches('/'), self.short_code),
            ..self.clone()
        }
    }
}

/// 待写入的新记录，id 和 created_at 由存储层分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
}
