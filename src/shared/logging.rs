use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "threadboard_lib=debug,info";

/// tracing サブスクライバを初期化する。二度目以降の呼び出しは何もしない。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("logging initialized");
    }
}
