//! Outbound channel over a JS `pushEvent(event, payload)` callback.
//!
//! The socket itself (LiveView hook, plain WebSocket wrapper, whatever the
//! host page uses) lives on the JS side and is handed in at mount.

use wasm_bindgen::JsValue;
use weft_core::{ChannelError, EditOperation, OperationSink, TEXT_OPERATION_EVENT};

/// Sends each operation as `pushEvent("text_operation", payload)`.
#[derive(Debug, Clone)]
pub struct JsChannel {
    push_event: js_sys::Function,
}

impl JsChannel {
    pub fn new(push_event: js_sys::Function) -> Self {
        Self { push_event }
    }
}

impl OperationSink for JsChannel {
    fn push_operation(&mut self, op: &EditOperation) -> Result<(), ChannelError> {
        let json = op
            .to_json()
            .map_err(|e| ChannelError::Send(e.to_string()))?;
        let payload = js_sys::JSON::parse(&json)
            .map_err(|e| ChannelError::Send(format!("{e:?}")))?;

        self.push_event
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(TEXT_OPERATION_EVENT),
                &payload,
            )
            .map(|_| ())
            .map_err(|e| ChannelError::Send(format!("{e:?}")))
    }
}
