pub mod rate_limiter;
pub mod url_service;

pub use rate_limiter::RateLimiter;
pub use url_service::{UrlService, UrlServiceOptions, code_cache_key, url_cache_key};
