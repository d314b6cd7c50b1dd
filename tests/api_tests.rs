//! HTTP API 集成测试
//!
//! 真实 SQLite 存储 + 内存缓存，经由 actix-web 测试服务调用。

mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};

use common::{BASE_URL, MockStore, bare_code, build_harness, sqlite_storage, test_options};
use linkpress::api::middleware::request_id::REQUEST_ID_HEADER;
use linkpress::api::middleware::{RateLimit, RequestIdMiddleware};
use linkpress::api::services::{AppStartTime, configure};
use linkpress::cache::MemoryCache;
use linkpress::services::{RateLimiter, UrlService};

fn app_data(service: Arc<UrlService>) -> (web::Data<Arc<UrlService>>, web::Data<AppStartTime>) {
    (web::Data::new(service), web::Data::new(AppStartTime::default()))
}

#[actix_rt::test]
async fn test_shorten_then_redirect() {
    let (storage, _dir) = sqlite_storage().await;
    let h = build_harness(storage, test_options());
    let (service, started) = app_data(h.service.clone());

    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let req = TestRequest::post()
        .uri("/shorten")
        .set_json(json!({ "url": "google.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["original_url"], "https://www.google.com");
    let short = body["short_code"].as_str().unwrap().to_string();
    assert!(short.starts_with(BASE_URL));

    let req = TestRequest::get()
        .uri(&format!("/{}", bare_code(&short)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        resp.headers().get(LOCATION).unwrap(),
        "https://www.google.com"
    );
}

#[actix_rt::test]
async fn test_shorten_invalid_url_is_bad_request() {
    let h = build_harness(Arc::new(MockStore::new()), test_options());
    let (service, started) = app_data(h.service.clone());
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let req = TestRequest::post()
        .uri("/shorten")
        .set_json(json!({ "url": "http://localhost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E001");

    let req = TestRequest::post()
        .uri("/shorten")
        .set_json(json!({ "url": "ftp://files.example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E002");
}

#[actix_rt::test]
async fn test_shorten_malformed_body_is_bad_request() {
    let h = build_harness(Arc::new(MockStore::new()), test_options());
    let (service, started) = app_data(h.service.clone());
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let req = TestRequest::post()
        .uri("/shorten")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_redirect_unknown_and_expired() {
    let store = Arc::new(MockStore::new());
    store
        .seed(
            "https://www.example.com",
            "old",
            Some(chrono::Utc::now() - chrono::Duration::minutes(1)),
        )
        .await;
    let h = build_harness(store, test_options());
    let (service, started) = app_data(h.service.clone());
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/missing").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E003");

    let resp = test::call_service(&app, TestRequest::get().uri("/old").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E004");

    let resp = test::call_service(&app, TestRequest::get().uri("/bad.code").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_store_failure_is_internal_error() {
    let store = Arc::new(MockStore::new());
    store
        .fail_reads
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let h = build_harness(store, test_options());
    let (service, started) = app_data(h.service.clone());
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Internal server error");
}

#[actix_rt::test]
async fn test_health() {
    let (storage, _dir) = sqlite_storage().await;
    let h = build_harness(storage, test_options());
    let (service, started) = app_data(h.service.clone());
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["backend"], "sqlite");
    assert_eq!(body["storage"]["links_count"], 0);
}

#[actix_rt::test]
async fn test_health_reports_unavailable_store() {
    let store = Arc::new(MockStore::new());
    store
        .fail_reads
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let h = build_harness(store, test_options());
    let (service, started) = app_data(h.service.clone());
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["storage"]["error"], "storage unavailable");
    // 存储错误细节只进日志
    assert!(!body.to_string().contains("store unavailable"));
}

#[actix_rt::test]
async fn test_rate_limit_applies_to_shorten() {
    let h = build_harness(Arc::new(MockStore::new()), test_options());
    let (service, started) = app_data(h.service.clone());
    let limiter = Arc::new(RateLimiter::new(
        Arc::new(MemoryCache::new()),
        2,
        Duration::from_secs(60),
    ));
    let app = test::init_service(
        App::new()
            .wrap(RateLimit::new(limiter, 60))
            .wrap(RequestIdMiddleware)
            .app_data(service)
            .app_data(started)
            .configure(configure),
    )
    .await;

    let peer = "192.0.2.10:5000".parse().unwrap();
    for i in 0..2 {
        let req = TestRequest::post()
            .uri("/shorten")
            .peer_addr(peer)
            .set_json(json!({ "url": format!("site{}.com", i) }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = TestRequest::post()
        .uri("/shorten")
        .peer_addr(peer)
        .set_json(json!({ "url": "site9.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E006");
}
