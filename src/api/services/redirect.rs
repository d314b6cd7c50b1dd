use std::sync::Arc;

use actix_web::http::header::{CACHE_CONTROL, LOCATION};
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::api::helpers::error_response;
use crate::errors::LinkpressError;
use crate::services::UrlService;

const MAX_CODE_LEN: usize = 32;

/// 短码只由 base62 字符组成，其余输入不必查缓存和数据库
fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        service: web::Data<Arc<UrlService>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            trace!("Invalid short code rejected: {}", code);
            return error_response(&LinkpressError::url_not_found(format!(
                "Short code not found: {}",
                code
            )));
        }

        match service.resolve(&code).await {
            Ok(record) => {
                debug!("Redirect {} -> {}", code, record.original_url);
                HttpResponse::MovedPermanently()
                    .insert_header((LOCATION, record.original_url))
                    .insert_header((CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
                    .finish()
            }
            Err(e) => error_response(&e),
        }
    }
}

pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{code}").route(web::get().to(RedirectService::handle_redirect))
}
