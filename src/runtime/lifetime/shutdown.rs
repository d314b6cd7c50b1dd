use std::time::Duration;

use actix_web::dev::ServerHandle;
use tokio::time::timeout;
use tracing::{error, info};

use crate::system::signal::wait_for_shutdown_signal;

/// 关闭超时时间（秒）
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待退出信号，然后让 HTTP server 在超时内处理完在途请求
pub async fn listen_for_shutdown(handle: ServerHandle) {
    wait_for_shutdown_signal().await;
    info!("Shutdown signal received, draining in-flight requests...");

    match timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        handle.stop(true),
    )
    .await
    {
        Ok(()) => info!("HTTP server stopped"),
        Err(_) => error!(
            "Graceful shutdown timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
