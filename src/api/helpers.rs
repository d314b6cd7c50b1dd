//! Response helpers shared by the HTTP handlers

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpResponse, error::JsonPayloadError, web};
use serde::Serialize;
use tracing::error;

use crate::errors::LinkpressError;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub message: &'a str,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(body)
}

/// 把业务错误映射为 `{code, message}` JSON
///
/// 5xx 只返回通用消息，细节写日志
pub fn error_response(err: &LinkpressError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("Request failed: {}", err);
        return json_response(
            status,
            &ErrorBody {
                code: err.code(),
                message: "Internal server error",
            },
        );
    }
    json_response(
        status,
        &ErrorBody {
            code: err.code(),
            message: err.message(),
        },
    )
}

/// 请求体无法解析时返回 400，格式与其他错误一致
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req| {
            let body = LinkpressError::invalid_url(format!("Invalid request body: {}", err));
            actix_web::error::InternalError::from_response(err, error_response(&body)).into()
        })
}
