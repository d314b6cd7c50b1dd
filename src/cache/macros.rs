#[macro_export]
macro_rules! declare_existence_filter_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_existence_filter_plugin() {
            use std::sync::Arc;
            use $crate::cache::register::{BoxedExistenceFilterFuture, register_filter_plugin};

            register_filter_plugin(
                $name,
                Arc::new(|| -> BoxedExistenceFilterFuture {
                    Box::pin(async {
                        let filter = <$ty>::from_config()?;
                        Ok::<_, $crate::errors::LinkpressError>(
                            Arc::new(filter) as Arc<dyn $crate::cache::traits::ExistenceFilter>
                        )
                    })
                }),
            );
        }
    };
}

#[macro_export]
macro_rules! declare_cache_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_cache_plugin() {
            use std::sync::Arc;
            use $crate::cache::register::{BoxedCacheFuture, register_cache_plugin};

            register_cache_plugin(
                $name,
                Arc::new(|| -> BoxedCacheFuture {
                    Box::pin(async {
                        let cache = <$ty>::from_config().await?;
                        Ok::<_, $crate::errors::LinkpressError>(
                            Arc::new(cache) as Arc<dyn $crate::cache::traits::CacheTier>
                        )
                    })
                }),
            );
        }
    };
}
