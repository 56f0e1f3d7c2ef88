//! Editing surface abstraction.
//!
//! Defines the `EditingSurface` trait for whatever the user types into: a
//! browser `<textarea>`, a terminal widget, or the in-memory `PlainSurface`
//! used for native embedding and tests. Capture and reconciliation only talk
//! to the surface through this trait.

use std::collections::HashMap;

use crate::input::{InputType, TextInputEvent};
use crate::text::{EditorRope, TextBuffer};
use crate::types::Selection;

/// A text-entry surface holding the visible value and selection.
///
/// All offsets are char offsets. Implementations backed by UTF-16 APIs
/// convert at this boundary.
pub trait EditingSurface {
    /// Current visible value.
    fn value(&self) -> String;

    /// Overwrite the visible value. Implementations may reset the selection.
    fn set_value(&mut self, value: &str);

    /// Current selection, or `None` if the surface cannot report one.
    fn selection(&self) -> Option<Selection>;

    /// Set the selection. Endpoints are already clamped by the caller.
    fn set_selection(&mut self, selection: Selection);

    /// Read a data attribute exposed at mount time.
    fn data_attribute(&self, name: &str) -> Option<String>;

    /// Give the surface input focus.
    ///
    /// Surfaces without a focus concept can ignore this.
    fn focus(&mut self) {}
}

/// In-memory editing surface that behaves like a plain `<textarea>`.
///
/// Besides implementing `EditingSurface`, it can simulate user edits and
/// return the input event a browser would fire for them.
#[derive(Debug, Clone, Default)]
pub struct PlainSurface {
    value: EditorRope,
    selection: Selection,
    attributes: HashMap<String, String>,
    focused: bool,
}

impl PlainSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface exposing `document` under the given data attribute.
    pub fn with_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut surface = Self::default();
        surface.attributes.insert(name.into(), value.into());
        surface
    }

    /// Whether `focus()` has been called.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Type a single character over the current selection.
    pub fn type_char(&mut self, c: char) -> TextInputEvent {
        let range = self.selection.to_range();
        let mut tmp = [0u8; 4];
        self.value.replace(range.clone(), c.encode_utf8(&mut tmp));
        self.selection = Selection::collapsed(range.start + 1);
        let input_type = if c == '\n' {
            InputType::InsertLineBreak
        } else {
            InputType::InsertText
        };
        self.event(input_type)
    }

    /// Type a string one character at a time, returning one event per char.
    pub fn type_str(&mut self, text: &str) -> Vec<TextInputEvent> {
        text.chars().map(|c| self.type_char(c)).collect()
    }

    /// Press Backspace.
    pub fn backspace(&mut self) -> TextInputEvent {
        let range = self.selection.to_range();
        if range.is_empty() {
            if range.start > 0 {
                self.value.delete(range.start - 1..range.start);
                self.selection = Selection::collapsed(range.start - 1);
            }
        } else {
            self.value.delete(range.clone());
            self.selection = Selection::collapsed(range.start);
        }
        self.event(InputType::DeleteContentBackward)
    }

    /// Press Delete.
    pub fn delete_forward(&mut self) -> TextInputEvent {
        let range = self.selection.to_range();
        if range.is_empty() {
            if range.start < self.value.len_chars() {
                self.value.delete(range.start..range.start + 1);
            }
        } else {
            self.value.delete(range.clone());
        }
        self.selection = Selection::collapsed(range.start);
        self.event(InputType::DeleteContentForward)
    }

    /// Paste `text` over the current selection.
    pub fn paste(&mut self, text: &str) -> TextInputEvent {
        let range = self.selection.to_range();
        self.value.replace(range.clone(), text);
        self.selection = Selection::collapsed(range.start + text.chars().count());
        self.event(InputType::InsertFromPaste)
    }

    /// Cut the current selection.
    pub fn cut(&mut self) -> TextInputEvent {
        let range = self.selection.to_range();
        self.value.delete(range.clone());
        self.selection = Selection::collapsed(range.start);
        self.event(InputType::DeleteByCut)
    }

    fn event(&self, input_type: InputType) -> TextInputEvent {
        TextInputEvent::new(self.value.to_string(), self.selection.head, input_type)
    }
}

impl EditingSurface for PlainSurface {
    fn value(&self) -> String {
        self.value.to_string()
    }

    fn set_value(&mut self, value: &str) {
        self.value.set_contents(value);
        // Like a textarea, assigning the value parks the caret at the end.
        self.selection = Selection::collapsed(self.value.len_chars());
    }

    fn selection(&self) -> Option<Selection> {
        Some(self.selection)
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.value.len_chars());
    }

    fn data_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}
