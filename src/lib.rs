//! Linkpress - a URL shortener service
//!
//! Shortening runs a tiered existence check (Bloom filter, then cache, then
//! durable store) before assigning a fresh code from a shared atomic counter.
//! Resolution reads through the cache and falls back to the store.
//!
//! # Architecture
//! - `utils`: URL validation and base62 code generation
//! - `cache`: existence filter and cache tier plugins (memory, redis)
//! - `storage`: SeaORM-backed durable store
//! - `services`: shorten/resolve orchestration and the rate limiter
//! - `api`: HTTP handlers and middleware
//! - `config`: configuration loading
//! - `runtime`: startup wiring, server mode and shutdown
//! - `system`: logging and signal handling

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
