//! Console logging for the browser client.

use std::str::FromStr;

use tracing::Level;
use tracing::subscriber::set_global_default;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` output to the browser console.
///
/// `level` is one of `trace`, `debug`, `info`, `warn`, `error`. Defaults to
/// `debug` in debug builds and `info` otherwise. Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    console_error_panic_hook::set_once();

    let default_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let console_level = level
        .as_deref()
        .and_then(|l| Level::from_str(l).ok())
        .unwrap_or(default_level);

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let reg = Registry::default().with(wasm_layer);
    // Already initialized is fine.
    let _ = set_global_default(reg);
}
