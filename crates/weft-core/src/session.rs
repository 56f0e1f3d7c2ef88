//! Editor session: one mounted surface, its replica, capture and reconciliation.
//!
//! The session is driven from a single event loop. Input events and canonical
//! updates are each handled to completion before the next one, so capture and
//! reconciliation never interleave.

use serde::Serialize;
use smol_str::SmolStr;

use crate::capture::EditCapture;
use crate::channel::OperationSink;
use crate::error::{Result, SyncError};
use crate::input::TextInputEvent;
use crate::protocol::{CanonicalUpdate, EditOperation};
use crate::reconcile::{Reconciled, ReconciliationEngine};
use crate::replica::LocalReplica;
use crate::surface::EditingSurface;
use crate::types::Selection;

/// Configuration for mounting a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Data attribute holding the initial document (`data-<name>` in HTML).
    pub document_attribute: SmolStr,
    /// Whether to focus the surface on mount.
    pub focus_on_mount: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            document_attribute: SmolStr::new_static("document"),
            focus_on_mount: true,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the initial document from a different data attribute.
    pub fn with_document_attribute(mut self, name: impl Into<SmolStr>) -> Self {
        self.document_attribute = name.into();
        self
    }

    /// Set whether the surface is focused on mount.
    pub fn with_focus_on_mount(mut self, focus: bool) -> Self {
        self.focus_on_mount = focus;
        self
    }
}

/// Diagnostic view of a session, for debug tooling only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSnapshot {
    pub document_len: usize,
    pub revision: Option<u64>,
    pub epoch: Option<u64>,
    pub pending: usize,
    pub applied_updates: u64,
    pub dropped_updates: u64,
    pub selection: Option<Selection>,
    /// Milliseconds since the last canonical update was applied.
    pub ms_since_last_update: Option<u64>,
}

/// A mounted editor.
pub struct EditorSession<S, C> {
    surface: S,
    replica: LocalReplica,
    capture: EditCapture<C>,
    engine: ReconciliationEngine,
    config: SessionConfig,
}

impl<S, C> EditorSession<S, C>
where
    S: EditingSurface,
    C: OperationSink,
{
    /// Mount on `surface`, seeding the replica from its initial document
    /// attribute and sending operations to `sink`.
    ///
    /// Fails if the attribute is missing rather than starting from an empty
    /// or undefined replica.
    pub fn mount(mut surface: S, sink: C, config: SessionConfig) -> Result<Self> {
        let initial = surface
            .data_attribute(&config.document_attribute)
            .ok_or_else(|| SyncError::MissingInitialDocument {
                attribute: config.document_attribute.to_string(),
            })?;

        if config.focus_on_mount {
            surface.focus();
        }
        surface.set_value(&initial);
        let replica = LocalReplica::new(&initial);

        tracing::debug!(
            attribute = %config.document_attribute,
            len = replica.len_chars(),
            "mounted editor session"
        );

        Ok(Self {
            surface,
            replica,
            capture: EditCapture::new(sink),
            engine: ReconciliationEngine::new(),
            config,
        })
    }

    /// Handle one input event from the surface.
    pub fn handle_input(&mut self, event: &TextInputEvent) -> Result<Option<EditOperation>> {
        self.capture.capture(&mut self.replica, event)
    }

    /// Handle one canonical update from the authority.
    pub fn handle_update(&mut self, update: &CanonicalUpdate) -> Reconciled {
        self.engine
            .apply(&mut self.surface, &mut self.replica, update)
    }

    /// Decode a `doc_update` payload and handle it.
    pub fn handle_update_json(&mut self, payload: &str) -> Result<Reconciled> {
        let update = CanonicalUpdate::from_json(payload)?;
        Ok(self.handle_update(&update))
    }

    /// Forget the last known authority revision.
    ///
    /// Call after reconnecting to an authority that may not share the old
    /// one's revision counter.
    pub fn reset_revision(&mut self) {
        tracing::debug!(revision = ?self.replica.revision(), "resetting known revision");
        self.replica.reset_revision();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn replica(&self) -> &LocalReplica {
        &self.replica
    }

    pub fn sink(&self) -> &C {
        self.capture.sink()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of session internals for a debug accessor.
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            document_len: self.replica.len_chars(),
            revision: self.replica.revision(),
            epoch: self.replica.epoch(),
            pending: self.replica.pending(),
            applied_updates: self.engine.applied_count(),
            dropped_updates: self.engine.dropped_count(),
            selection: self.surface.selection(),
            ms_since_last_update: self
                .engine
                .last_applied_at()
                .map(|at| at.elapsed().as_millis() as u64),
        }
    }
}
