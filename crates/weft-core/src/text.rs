//! Text buffer abstraction for document storage.
//!
//! The `TextBuffer` trait provides a common interface for text storage. The
//! client keeps its local replica in one, and the server keeps the
//! authoritative document in one.

use std::ops::Range;

use crate::types::EditInfo;

/// A text buffer that supports efficient editing and offset conversion.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Replace the whole content.
    fn set_contents(&mut self, text: &str) {
        let len = self.len_chars();
        self.replace(0..len, text);
    }

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;

    /// Get info about the last edit operation, if any.
    fn last_edit(&self) -> Option<EditInfo>;
}

/// Ropey-backed text buffer.
///
/// Provides O(log n) editing operations and offset conversions.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
    last_edit: Option<EditInfo>,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
            last_edit: None,
        }
    }

    /// Check whether the content equals `text` without allocating.
    pub fn content_eq(&self, text: &str) -> bool {
        self.rope == text
    }
}

impl std::fmt::Debug for EditorRope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorRope")
            .field("len_chars", &self.rope.len_chars())
            .field("last_edit", &self.last_edit)
            .finish()
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);

        self.last_edit = Some(EditInfo {
            edit_char_pos: char_offset,
            inserted_len: text.chars().count(),
            deleted_len: 0,
            doc_len_after: self.rope.len_chars(),
        });
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let deleted_len = char_range.len();

        self.rope.remove(char_range.clone());

        self.last_edit = Some(EditInfo {
            edit_char_pos: char_range.start,
            inserted_len: 0,
            deleted_len,
            doc_len_after: self.rope.len_chars(),
        });
    }

    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let deleted_len = char_range.len();
        self.rope.remove(char_range.clone());
        self.rope.insert(char_range.start, text);

        self.last_edit = Some(EditInfo {
            edit_char_pos: char_range.start,
            inserted_len: text.chars().count(),
            deleted_len,
            doc_len_after: self.rope.len_chars(),
        });
    }

    fn set_contents(&mut self, text: &str) {
        let deleted_len = self.rope.len_chars();
        self.rope = ropey::Rope::from_str(text);

        self.last_edit = Some(EditInfo {
            edit_char_pos: 0,
            inserted_len: self.rope.len_chars(),
            deleted_len,
            doc_len_after: self.rope.len_chars(),
        });
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn last_edit(&self) -> Option<EditInfo> {
        self.last_edit.clone()
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
