use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Reads `RUST_LOG`; without it, logs at `debug` in debug builds and `info`
/// in release builds.
pub fn setup_tracing() {
    let env_filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cfg!(debug_assertions) { "debug" } else { "info" };
        format!(
            "{level},{}={level},weft_core={level},tower_http=info,axum::rejection=trace",
            env!("CARGO_CRATE_NAME"),
        )
        .into()
    });
    tracing_subscriber::registry()
        .with(env_filter_layer)
        .with(fmt::layer().compact())
        .init();
}
