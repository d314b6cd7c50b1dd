use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use serde::Serialize;
use tracing::{error, trace};

use crate::api::helpers::json_response;
use crate::services::UrlService;

const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: &'static str,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: i64,
    pub storage: StorageCheck,
    pub response_time_ms: u64,
}

/// Health Service
///
/// 直接查存储，不经过缓存：探针需要知道事实来源是否可用
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<UrlService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let started = Instant::now();
        trace!("Received health check request");

        let store = service.store();
        let backend = store.backend_name().to_string();

        let storage = match tokio::time::timeout(STORE_CHECK_TIMEOUT, store.count()).await {
            Ok(Ok(count)) => StorageCheck {
                status: "healthy",
                backend,
                links_count: Some(count),
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                StorageCheck {
                    status: "unhealthy",
                    backend,
                    links_count: None,
                    error: Some("storage unavailable"),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                StorageCheck {
                    status: "unhealthy",
                    backend,
                    links_count: None,
                    error: Some("timeout"),
                }
            }
        };

        let healthy = storage.status == "healthy";
        let now = chrono::Utc::now();
        let body = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            timestamp: now,
            uptime_secs: (now - app_start_time.start_datetime).num_seconds(),
            storage,
            response_time_ms: started.elapsed().as_millis() as u64,
        };

        let status = if healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(status, &body)
    }
}

pub fn health_routes() -> actix_web::Resource {
    web::resource("/health").route(web::get().to(HealthService::health_check))
}
