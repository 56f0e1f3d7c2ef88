//! Core editor types: selection and edit tracking.
//!
//! These types are framework-agnostic and can be used with any editing surface.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
/// Offsets are in chars (Unicode scalar values), not bytes or UTF-16 units.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Check if the selection is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }

    /// Clamp both endpoints into `[0, len]`, keeping direction.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }

    /// Whether either endpoint lies past `len`.
    pub fn exceeds(&self, len: usize) -> bool {
        self.end() > len
    }
}

/// Summary of the last change made to a `TextBuffer`.
///
/// The authority logs it after each applied operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditInfo {
    /// Character offset where the edit occurred
    pub edit_char_pos: usize,
    /// Number of characters inserted
    pub inserted_len: usize,
    /// Number of characters deleted
    pub deleted_len: usize,
    /// Document length (in chars) after this edit was applied.
    pub doc_len_after: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds() {
        // Forward selection
        let sel = Selection::new(5, 10);
        assert_eq!(sel.start(), 5);
        assert_eq!(sel.end(), 10);
        assert!(!sel.is_backwards());

        // Backward selection
        let sel = Selection::new(10, 5);
        assert_eq!(sel.start(), 5);
        assert_eq!(sel.end(), 10);
        assert!(sel.is_backwards());
    }

    #[test]
    fn test_selection_collapsed() {
        let sel = Selection::collapsed(7);
        assert_eq!(sel.start(), sel.end());
        assert_eq!(sel.to_range(), 7..7);
    }

    #[test]
    fn test_selection_clamp() {
        let sel = Selection::new(5, 5).clamp(3);
        assert_eq!(sel, Selection::collapsed(3));

        // Direction survives clamping.
        let sel = Selection::new(9, 2).clamp(4);
        assert_eq!(sel, Selection::new(4, 2));
        assert!(sel.is_backwards());

        assert!(Selection::new(1, 6).exceeds(5));
        assert!(!Selection::new(1, 5).exceeds(5));
    }
}
