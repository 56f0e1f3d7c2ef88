//! JS-facing editor hook.
//!
//! The host page mounts one hook per textarea, passing its `pushEvent`
//! callback, and forwards every `doc_update` it receives to
//! [`EditorHook::handle_doc_update`].
//!
//! ```js
//! const hook = new EditorHook(textarea, (event, payload) => channel.push(event, payload));
//! channel.on("doc_update", (payload) => hook.handleDocUpdate(payload));
//! channel.onReconnect(() => hook.resetRevision());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use weft_core::{EditorSession, Reconciled, SessionConfig, SyncError};

use crate::channel::JsChannel;
use crate::events::read_input_event;
use crate::surface::TextAreaSurface;

type BrowserSession = EditorSession<TextAreaSurface, JsChannel>;

fn to_js(err: SyncError) -> JsError {
    JsError::new(&err.to_string())
}

/// A mounted editor: one textarea wired to one channel.
///
/// Dropping the hook (or calling `free()` from JS) removes the input listener.
#[wasm_bindgen]
pub struct EditorHook {
    session: Rc<RefCell<BrowserSession>>,
    _input: EventListener,
}

#[wasm_bindgen]
impl EditorHook {
    /// Mount on `element`, seeding from its `data-document` attribute (or
    /// `data-<document_attribute>` if given).
    #[wasm_bindgen(constructor)]
    pub fn mount(
        element: web_sys::HtmlTextAreaElement,
        push_event: js_sys::Function,
        document_attribute: Option<String>,
    ) -> Result<EditorHook, JsError> {
        let mut config = SessionConfig::new();
        if let Some(name) = document_attribute {
            config = config.with_document_attribute(name);
        }

        let surface = TextAreaSurface::new(element.clone());
        let session = EditorSession::mount(surface, JsChannel::new(push_event), config)
            .map_err(to_js)?;
        let session = Rc::new(RefCell::new(session));

        let listener_session = session.clone();
        let input = EventListener::new(&element, "input", move |event| {
            let Ok(mut session) = listener_session.try_borrow_mut() else {
                tracing::warn!("input event while session busy, deferring to next diff");
                return;
            };
            let input = read_input_event(session.surface().element(), event);
            if let Err(e) = session.handle_input(&input) {
                tracing::warn!(error = %e, "edit capture failed");
            }
        });

        Ok(EditorHook {
            session,
            _input: input,
        })
    }

    /// Apply a `doc_update` payload, given as an object or a JSON string.
    ///
    /// Returns `false` when the update was older than the current state and
    /// was dropped.
    #[wasm_bindgen(js_name = handleDocUpdate)]
    pub fn handle_doc_update(&self, payload: JsValue) -> Result<bool, JsError> {
        let json = match payload.as_string() {
            Some(s) => s,
            None => js_sys::JSON::stringify(&payload)
                .map(String::from)
                .map_err(|e| JsError::new(&format!("unserializable payload: {e:?}")))?,
        };

        let mut session = self
            .session
            .try_borrow_mut()
            .map_err(|_| JsError::new("editor session is busy"))?;
        let outcome = session.handle_update_json(&json).map_err(to_js)?;
        Ok(matches!(outcome, Reconciled::Applied { .. }))
    }

    /// Forget the last known authority revision. Call after the socket
    /// reconnects.
    #[wasm_bindgen(js_name = resetRevision)]
    pub fn reset_revision(&self) -> Result<(), JsError> {
        let mut session = self
            .session
            .try_borrow_mut()
            .map_err(|_| JsError::new("editor session is busy"))?;
        session.reset_revision();
        Ok(())
    }

    /// Session internals as JSON, for debugging only.
    #[wasm_bindgen(js_name = debugState)]
    pub fn debug_state(&self) -> Result<String, JsError> {
        let session = self
            .session
            .try_borrow()
            .map_err(|_| JsError::new("editor session is busy"))?;
        serde_json::to_string(&session.debug_snapshot()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Current value of the local replica.
    #[wasm_bindgen(js_name = replicaContent)]
    pub fn replica_content(&self) -> Result<String, JsError> {
        let session = self
            .session
            .try_borrow()
            .map_err(|_| JsError::new("editor session is busy"))?;
        Ok(session.replica().content())
    }
}
