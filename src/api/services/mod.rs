pub mod health;
pub mod redirect;
pub mod shorten;

pub use health::{AppStartTime, HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use shorten::{ShortenRequest, ShortenService, shorten_routes};

use actix_web::web;

/// 注册全部路由。`/{code}` 是兜底路由，必须最后注册
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(shorten_routes())
        .service(redirect_routes());
}
