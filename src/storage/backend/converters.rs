use chrono::{DateTime, Utc};

use crate::storage::{NewUrlRecord, UrlRecord};
use migration::entities::url;

pub fn model_to_record(model: url::Model) -> UrlRecord {
    UrlRecord {
        id: model.id,
        original_url: model.original_url,
        short_code: model.short_code,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

/// 新记录的 ActiveModel；id 交给数据库自增
pub fn new_record_to_active_model(record: &NewUrlRecord, created_at: DateTime<Utc>) -> url::ActiveModel {
    use sea_orm::ActiveValue::*;

    url::ActiveModel {
        id: NotSet,
        short_code: Set(record.short_code.clone()),
        original_url: Set(record.original_url.clone()),
        created_at: Set(created_at),
        expires_at: Set(record.expires_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::ActiveValue;

    #[test]
    fn test_model_to_record() {
        let now = Utc::now();
        let model = url::Model {
            id: 42,
            short_code: "G".to_string(),
            original_url: "https://www.example.com".to_string(),
            created_at: now,
            expires_at: Some(now + Duration::hours(24)),
        };

        let record = model_to_record(model);
        assert_eq!(record.id, 42);
        assert_eq!(record.short_code, "G");
        assert_eq!(record.created_at, now);
        assert!(record.expires_at.is_some());
    }

    #[test]
    fn test_new_record_leaves_id_unset() {
        let record = NewUrlRecord {
            original_url: "https://www.example.com".to_string(),
            short_code: "abc".to_string(),
            expires_at: None,
        };
        let active = new_record_to_active_model(&record, Utc::now());

        assert!(matches!(active.id, ActiveValue::NotSet));
        assert!(matches!(active.short_code, ActiveValue::Set(ref c) if c == "abc"));
        assert!(matches!(active.expires_at, ActiveValue::Set(None)));
    }
}
