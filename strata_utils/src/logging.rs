#[macro_export]
macro_rules! debug_panic {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            panic!($($arg)*);
        } else {
            $crate::tracing::error!($($arg)*);
        }
    };
}

/// Installs a formatting subscriber that reads its filter from `RUST_LOG`.
///
/// Calling this more than once is harmless, later calls are ignored.
#[cfg(feature = "subscriber")]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_names(true)
        .try_init();
}
