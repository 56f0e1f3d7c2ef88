//! Edit capture: input events in, edit operations out.
//!
//! Every input event is classified into at most one [`EditOperation`]:
//!
//! - a single typed character becomes `Insert { at: cursor, char }`, where
//!   `char` is the character just before the post-edit caret;
//! - a single Backspace becomes `Delete { at: cursor + 1 }`;
//! - everything else (paste, cut, forward delete, typing over a selection,
//!   IME, native undo, unknown kinds) becomes a `Replace` computed by diffing
//!   the local replica against the post-edit value.
//!
//! The operation is pushed to the channel exactly once and the replica is
//! advanced to the post-edit value. If classification or the send fails, the
//! replica is left untouched, so the next event's diff also carries the
//! change that was not delivered.

use crate::channel::OperationSink;
use crate::error::{Result, SyncError};
use crate::input::{InputType, TextInputEvent};
use crate::protocol::EditOperation;
use crate::replica::LocalReplica;
use crate::text_helpers::{char_len, diff_text};

/// Turns input events into edit operations and sends them.
///
/// The channel is injected at construction; capture never looks it up
/// globally.
#[derive(Debug)]
pub struct EditCapture<C> {
    sink: C,
}

impl<C: OperationSink> EditCapture<C> {
    pub fn new(sink: C) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    /// Classify `event` against `replica` and send the resulting operation.
    ///
    /// Returns the operation that was sent, or `None` when the event did not
    /// change anything.
    pub fn capture(
        &mut self,
        replica: &mut LocalReplica,
        event: &TextInputEvent,
    ) -> Result<Option<EditOperation>> {
        let Some(op) = classify(replica, event)? else {
            tracing::trace!(input_type = ?event.input_type, "input event produced no operation");
            replica.adopt_local(&event.value);
            return Ok(None);
        };

        if let Err(e) = self.sink.push_operation(&op) {
            tracing::warn!(error = %e, kind = op.kind(), "failed to send edit operation");
            return Err(SyncError::Channel(e));
        }

        tracing::debug!(kind = op.kind(), ?op, "sent edit operation");
        replica.advance_local(&event.value);
        Ok(Some(op))
    }
}

/// Classify one input event into at most one operation.
///
/// Pure: does not touch the replica or any channel.
pub fn classify(replica: &LocalReplica, event: &TextInputEvent) -> Result<Option<EditOperation>> {
    let new_len = char_len(&event.value);
    if event.cursor > new_len {
        return Err(SyncError::CursorOutOfRange {
            offset: event.cursor,
            len: new_len,
        });
    }
    let old_len = replica.len_chars();

    let single = match &event.input_type {
        InputType::InsertText | InputType::InsertLineBreak | InputType::InsertParagraph => {
            single_insert(event, old_len, new_len)
        }
        InputType::DeleteContentBackward => single_backspace(event, old_len, new_len),
        InputType::InsertCompositionText
        | InputType::InsertFromPaste
        | InputType::InsertFromDrop
        | InputType::InsertReplacementText
        | InputType::InsertFromYank
        | InputType::DeleteContentForward
        | InputType::DeleteWordBackward
        | InputType::DeleteWordForward
        | InputType::DeleteSoftLineBackward
        | InputType::DeleteSoftLineForward
        | InputType::DeleteHardLineBackward
        | InputType::DeleteHardLineForward
        | InputType::DeleteByCut
        | InputType::DeleteByDrag
        | InputType::DeleteContent
        | InputType::HistoryUndo
        | InputType::HistoryRedo => None,
        InputType::Unknown(kind) => {
            tracing::warn!(kind = %kind, "unrecognized input type, sending diff");
            None
        }
    };

    if single.is_some() {
        return Ok(single);
    }

    let old = replica.content();
    Ok(
        diff_text(&old, &event.value, Some(event.cursor)).map(|diff| EditOperation::Replace {
            from: diff.start,
            to: diff.old_end,
            text: diff.inserted,
        }),
    )
}

/// A typed character: the value grew by exactly one and the character ends
/// at the caret.
fn single_insert(event: &TextInputEvent, old_len: usize, new_len: usize) -> Option<EditOperation> {
    if new_len != old_len + 1 || event.cursor == 0 {
        return None;
    }
    let ch = event.value.chars().nth(event.cursor - 1)?;
    Some(EditOperation::Insert {
        at: event.cursor,
        ch,
    })
}

/// A single Backspace: the value shrank by exactly one; the removed character
/// sat right after the post-edit caret in the pre-edit value.
fn single_backspace(
    event: &TextInputEvent,
    old_len: usize,
    new_len: usize,
) -> Option<EditOperation> {
    if new_len + 1 != old_len {
        return None;
    }
    Some(EditOperation::Delete {
        at: event.cursor + 1,
    })
}
