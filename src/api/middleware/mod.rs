pub mod rate_limit;
pub mod request_id;

pub use rate_limit::RateLimit;
pub use request_id::{RequestId, RequestIdMiddleware};
