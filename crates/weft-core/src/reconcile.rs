//! Reconciliation: apply canonical updates pushed by the authority.
//!
//! The authority always wins. Every update overwrites both the surface value
//! and the local replica, whether or not it reflects this client's own edits;
//! there is no acknowledgement tracking. Keystrokes that have not round-tripped
//! yet may be visually overwritten.
//!
//! Cursor placement:
//! - `cursor_pos` present: collapse the selection there.
//! - `cursor_pos` absent: keep the selection read *before* the value was
//!   replaced, clamped into the new document.
//!
//! Updates carrying a revision older than one already applied in the same
//! authority epoch are dropped; a newer canonical state has already replaced
//! the replica. A different epoch means the authority restarted, and its
//! updates are applied whatever their revision.

use web_time::Instant;

use crate::protocol::CanonicalUpdate;
use crate::replica::LocalReplica;
use crate::surface::EditingSurface;
use crate::text_helpers::char_len;
use crate::types::Selection;

/// What applying one canonical update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The update replaced the local state.
    Applied {
        /// Selection set on the surface, if the surface reports selections.
        selection: Option<Selection>,
        /// Whether a selection endpoint had to be pulled back into range.
        clamped: bool,
        /// Local operations that were still unconfirmed when this landed.
        overwritten_pending: usize,
    },
    /// The update was older than the current replica and was ignored.
    Stale { revision: u64, current: u64 },
}

impl Reconciled {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Applies canonical updates to a surface and its replica.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    applied: u64,
    dropped: u64,
    last_applied_at: Option<Instant>,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `update` to `surface` and `replica`.
    pub fn apply<S: EditingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        replica: &mut LocalReplica,
        update: &CanonicalUpdate,
    ) -> Reconciled {
        if let (Some(incoming), Some(current)) = (update.revision, replica.revision()) {
            if incoming < current && update.epoch == replica.epoch() {
                tracing::debug!(incoming, current, "dropping out-of-order canonical update");
                self.dropped += 1;
                return Reconciled::Stale {
                    revision: incoming,
                    current,
                };
            }
        }

        let overwritten_pending = replica.pending();
        if overwritten_pending > 0 {
            tracing::trace!(
                pending = overwritten_pending,
                "canonical update overwrites unconfirmed local edits"
            );
        }

        // Read before mutating: assigning the value resets the selection.
        let previous = surface.selection();

        surface.set_value(&update.document);
        replica.overwrite(&update.document, update.revision, update.epoch);

        let len = char_len(&update.document);
        let (selection, clamped) = match update.cursor_pos {
            Some(pos) => (Some(Selection::collapsed(pos.min(len))), pos > len),
            None => match previous {
                Some(sel) => (Some(sel.clamp(len)), sel.exceeds(len)),
                None => (None, false),
            },
        };

        if let Some(selection) = selection {
            surface.set_selection(selection);
        }
        if clamped {
            tracing::debug!(len, ?selection, "clamped selection into canonical document");
        }

        self.applied += 1;
        self.last_applied_at = Some(Instant::now());

        Reconciled::Applied {
            selection,
            clamped,
            overwritten_pending,
        }
    }

    /// Number of updates applied.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Number of stale updates dropped.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// When the last update was applied.
    pub fn last_applied_at(&self) -> Option<Instant> {
        self.last_applied_at
    }
}
