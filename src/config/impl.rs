use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration from "config.toml" in the current directory.
///
/// If the file doesn't exist, uses in-memory defaults (plus `LP__*` overrides).
///
/// # Examples
/// ```no_run
/// use linkpress::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    init_config_from("config.toml");
}

/// Initialize the global configuration from an explicit file path.
///
/// Only the first call has an effect.
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Replace the whole configuration (tests and reload paths)
pub fn update_config(config: StaticConfig) {
    match CONFIG.get() {
        Some(current) => current.store(Arc::new(config)),
        None => {
            let _ = CONFIG.set(ArcSwap::from_pointee(config));
        }
    }
}
