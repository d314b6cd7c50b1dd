//! Per-client fixed-window rate limiting
//!
//! 按连接对端 IP 计数。缓存层故障时放行请求（只记日志），限流不能把服务拖垮。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{CONTENT_TYPE, RETRY_AFTER},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::errors::LinkpressError;
use crate::services::RateLimiter;
use crate::utils::ip::extract_client_ip;

#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
    retry_after_secs: u64,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>, retry_after_secs: u64) -> Self {
        Self {
            limiter,
            retry_after_secs,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            retry_after_secs: self.retry_after_secs,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
    retry_after_secs: u64,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limiter = self.limiter.clone();
        let retry_after = self.retry_after_secs;

        Box::pin(async move {
            if limiter.is_enabled() {
                let client = extract_client_ip(&req.connection_info())
                    .unwrap_or_else(|| "unknown".to_string());

                match limiter.check(&client).await {
                    Ok(()) => {}
                    Err(LinkpressError::RateLimitExceeded(_)) => {
                        debug!("Rate limit exceeded for {}", client);
                        return Ok(req.into_response(
                            HttpResponse::TooManyRequests()
                                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                                .insert_header((RETRY_AFTER, retry_after.to_string()))
                                .json(serde_json::json!({
                                    "code": "E006",
                                    "message": "Rate limit exceeded",
                                }))
                                .map_into_right_body(),
                        ));
                    }
                    Err(e) => {
                        warn!("Rate limiter unavailable, letting request through: {}", e);
                    }
                }
            }

            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
