pub mod helpers;
pub mod middleware;
pub mod services;
