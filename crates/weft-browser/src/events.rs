//! Browser event handling for the editor.
//!
//! Turns DOM `input` events on a textarea into [`TextInputEvent`]s. The
//! browser reports caret offsets in UTF-16 code units; everything handed to
//! the core is in chars.

use wasm_bindgen::JsCast;
use weft_core::{InputType, TextInputEvent, utf16_to_char_offset};

// === InputType browser parsing ===

/// Parse a browser inputType string to an InputType enum.
///
/// This handles the W3C Input Events inputType values as returned by
/// `InputEvent.inputType` in browsers. Rich-text kinds a textarea never
/// produces fall through to `Unknown`.
pub fn parse_browser_input_type(s: &str) -> InputType {
    match s {
        // Insertion
        "insertText" => InputType::InsertText,
        "insertCompositionText" => InputType::InsertCompositionText,
        "insertLineBreak" => InputType::InsertLineBreak,
        "insertParagraph" => InputType::InsertParagraph,
        "insertFromPaste" => InputType::InsertFromPaste,
        "insertFromDrop" => InputType::InsertFromDrop,
        "insertReplacementText" => InputType::InsertReplacementText,
        "insertFromYank" => InputType::InsertFromYank,

        // Deletion
        "deleteContentBackward" => InputType::DeleteContentBackward,
        "deleteContentForward" => InputType::DeleteContentForward,
        "deleteWordBackward" => InputType::DeleteWordBackward,
        "deleteWordForward" => InputType::DeleteWordForward,
        "deleteSoftLineBackward" => InputType::DeleteSoftLineBackward,
        "deleteSoftLineForward" => InputType::DeleteSoftLineForward,
        "deleteEntireSoftLine" => InputType::DeleteSoftLineBackward,
        "deleteHardLineBackward" => InputType::DeleteHardLineBackward,
        "deleteHardLineForward" => InputType::DeleteHardLineForward,
        "deleteByCut" => InputType::DeleteByCut,
        "deleteByDrag" => InputType::DeleteByDrag,
        "deleteContent" => InputType::DeleteContent,

        // History
        "historyUndo" => InputType::HistoryUndo,
        "historyRedo" => InputType::HistoryRedo,

        // Unknown
        other => InputType::Unknown(other.to_string()),
    }
}

/// Build a [`TextInputEvent`] from a post-edit value and a UTF-16 caret.
///
/// A missing caret (the element lost its selection) is read as the end of
/// the value.
pub fn text_input_event(value: String, caret_utf16: Option<u32>, input_type: &str) -> TextInputEvent {
    let cursor = match caret_utf16 {
        Some(offset) => utf16_to_char_offset(&value, offset as usize),
        None => value.chars().count(),
    };
    TextInputEvent::new(value, cursor, parse_browser_input_type(input_type))
}

/// Get input type string from a DOM event.
///
/// Plain `Event`s dispatched as `input` (no `inputType`) yield an empty string,
/// which parses as `Unknown`.
pub fn input_type_of(event: &web_sys::Event) -> String {
    event
        .dyn_ref::<web_sys::InputEvent>()
        .map(|e| e.input_type())
        .unwrap_or_default()
}

/// Read the state of `textarea` right after an `input` event.
pub fn read_input_event(textarea: &web_sys::HtmlTextAreaElement, event: &web_sys::Event) -> TextInputEvent {
    // selectionEnd is the post-edit caret for every edit a textarea performs.
    let caret = textarea.selection_end().ok().flatten();
    text_input_event(textarea.value(), caret, &input_type_of(event))
}
