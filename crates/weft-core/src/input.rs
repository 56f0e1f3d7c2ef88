//! Input event types.
//!
//! `InputType` represents the semantic intent of an input event, abstracted
//! from the platform-specific event source. `TextInputEvent` is what edit
//! capture consumes: the value after the edit, the caret after the edit, and
//! the kind of edit.

/// Semantic input types from input events.
///
/// Based on the W3C Input Events specification, but usable across platforms.
/// Only the kinds a plain-text surface can produce are listed; anything else
/// arrives as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    // === Insertion ===
    /// Insert typed text.
    InsertText,
    /// Insert text from IME composition.
    InsertCompositionText,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    /// Insert a paragraph break (Enter).
    InsertParagraph,
    /// Insert from paste operation.
    InsertFromPaste,
    /// Insert from drop operation.
    InsertFromDrop,
    /// Insert replacement text (e.g., spell check correction).
    InsertReplacementText,
    /// Insert from a kill-ring yank.
    InsertFromYank,

    // === Deletion ===
    /// Delete content backward (Backspace).
    DeleteContentBackward,
    /// Delete content forward (Delete key).
    DeleteContentForward,
    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward,
    /// Delete word forward (Ctrl/Alt+Delete).
    DeleteWordForward,
    /// Delete to soft line boundary backward.
    DeleteSoftLineBackward,
    /// Delete to soft line boundary forward.
    DeleteSoftLineForward,
    /// Delete to hard line boundary backward (Cmd+Backspace on Mac).
    DeleteHardLineBackward,
    /// Delete to hard line boundary forward (Cmd+Delete on Mac).
    DeleteHardLineForward,
    /// Delete by cut operation.
    DeleteByCut,
    /// Delete by drag operation.
    DeleteByDrag,
    /// Generic content deletion.
    DeleteContent,

    // === History ===
    /// Native undo of the text surface.
    HistoryUndo,
    /// Native redo of the text surface.
    HistoryRedo,

    // === Unknown ===
    /// Unrecognized input type.
    Unknown(String),
}

/// A text-input event as observed on the editing surface, after the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputEvent {
    /// Full surface value after the edit.
    pub value: String,
    /// Caret offset (chars) immediately after the edit.
    pub cursor: usize,
    /// What kind of edit produced this event.
    pub input_type: InputType,
}

impl TextInputEvent {
    pub fn new(value: impl Into<String>, cursor: usize, input_type: InputType) -> Self {
        Self {
            value: value.into(),
            cursor,
            input_type,
        }
    }
}
