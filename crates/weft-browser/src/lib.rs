//! Browser binding for the weft editor client.
//!
//! Drives a plain `<textarea>` with the capture/reconcile loop from
//! `weft-core`. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `events`: DOM `input` events to `TextInputEvent`, UTF-16 to char offsets
//! - `surface`: `EditingSurface` over `HtmlTextAreaElement`
//! - `channel`: `OperationSink` over a JS `pushEvent` callback
//! - `hook`: the `EditorHook` exported to JS
//! - `telemetry`: console logging and panic hook
//!
//! # Re-exports
//!
//! This crate re-exports `weft-core` for convenience, so consumers only need
//! to depend on `weft-browser`.

pub use weft_core;
pub use weft_core::*;

pub mod channel;
pub mod events;
pub mod hook;
pub mod surface;
pub mod telemetry;

pub use channel::JsChannel;
pub use events::{parse_browser_input_type, read_input_event, text_input_event};
pub use hook::EditorHook;
pub use surface::TextAreaSurface;
pub use telemetry::init_logging;
