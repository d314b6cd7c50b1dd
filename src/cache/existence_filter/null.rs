use tracing::trace;

use crate::cache::ExistenceFilter;
use crate::declare_existence_filter_plugin;
use crate::errors::Result;

declare_existence_filter_plugin!("null", NullExistenceFilter);

/// 关闭过滤器时使用：永远返回“可能存在”，每次 Shorten 都走去重查询
pub struct NullExistenceFilter;

impl NullExistenceFilter {
    pub fn from_config() -> Result<Self> {
        trace!("Using NullExistenceFilter: every shorten request runs the dedup lookup");
        Ok(NullExistenceFilter)
    }
}

impl ExistenceFilter for NullExistenceFilter {
    fn contains(&self, _key: &str) -> bool {
        true
    }

    fn add(&self, _key: &str) {
        trace!("NullExistenceFilter: skip add");
    }

    fn add_all(&self, _keys: &[String]) {
        trace!("NullExistenceFilter: skip add_all");
    }
}
