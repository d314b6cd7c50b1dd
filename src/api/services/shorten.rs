use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::api::helpers::{error_response, json_config, json_response};
use crate::services::UrlService;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

pub struct ShortenService;

impl ShortenService {
    /// `POST /shorten`，成功返回 201 和带完整前缀的记录
    pub async fn handle_shorten(
        body: web::Json<ShortenRequest>,
        service: web::Data<Arc<UrlService>>,
    ) -> impl Responder {
        let ShortenRequest { url } = body.into_inner();
        trace!("Shorten request for: {}", url);

        match service.shorten(&url).await {
            Ok(record) => {
                debug!("Shorten succeeded: {} -> {}", url, record.short_code);
                json_response(StatusCode::CREATED, &record)
            }
            Err(e) => error_response(&e),
        }
    }
}

pub fn shorten_routes() -> actix_web::Resource {
    web::resource("/shorten")
        .app_data(json_config())
        .route(web::post().to(ShortenService::handle_shorten))
}
