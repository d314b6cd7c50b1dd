//! Server mode
//!
//! Wires the startup context into an actix-web server and runs it until a
//! shutdown signal arrives.

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::{RateLimit, RequestIdMiddleware};
use crate::api::services::{AppStartTime, configure};
use crate::config::get_config;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::default();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let url_service = startup.url_service.clone();
    let rate_limiter = startup.rate_limiter.clone();

    let config = get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let retry_after = config.rate_limit.window_secs;
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    warn!("Using {} CPU cores for the server", cpu_count);
    warn!("Public base URL: {}", config.server.public_base_url());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RateLimit::new(rate_limiter.clone(), retry_after))
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Connection", "keep-alive")))
            .app_data(web::Data::new(url_service.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(configure)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .shutdown_timeout(lifetime::shutdown::SHUTDOWN_TIMEOUT_SECS)
    .disable_signals()
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    let handle = server.handle();

    // 关闭期间 server future 仍需被 poll，才能处理完在途请求
    tokio::select! {
        res = server => {
            res.context("HTTP server exited with error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(handle) => {}
    }

    warn!("Graceful shutdown complete");
    Ok(())
}
