//! Text analysis helpers.
//!
//! Minimal diffing between two versions of a document, and conversions
//! between char offsets (what the core uses everywhere) and UTF-16 code
//! unit offsets (what browser selection APIs report).

/// A minimal replacement turning one text into another.
///
/// `start..old_end` is a char range in the old text; `inserted` is what
/// replaces it. Equivalently, `start..start + inserted.chars().count()` is the
/// char range of the new text that differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    pub start: usize,
    pub old_end: usize,
    pub inserted: String,
}

/// Compute the minimal common-prefix/common-suffix diff between `old` and `new`.
///
/// Returns `None` when the texts are equal. When the change is a pure
/// insertion or pure deletion inside a run of repeated characters, the
/// location is ambiguous; `cursor` (the caret offset in `new` after the edit)
/// is used to slide the change so that insertions end at the cursor and
/// deletions start at it.
pub fn diff_text(old: &str, new: &str, cursor: Option<usize>) -> Option<TextDiff> {
    if old == new {
        return None;
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let common_prefix = old_chars
        .iter()
        .zip(new_chars.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Common suffix, but don't overlap with the prefix.
    let remaining_old = old_chars.len() - common_prefix;
    let remaining_new = new_chars.len() - common_prefix;
    let common_suffix = old_chars[common_prefix..]
        .iter()
        .rev()
        .zip(new_chars[common_prefix..].iter().rev())
        .take(remaining_old.min(remaining_new))
        .take_while(|(a, b)| a == b)
        .count();

    let mut start = common_prefix;
    let mut old_end = old_chars.len() - common_suffix;
    let mut new_end = new_chars.len() - common_suffix;

    if let Some(cursor) = cursor {
        if old_end == start {
            // Pure insertion: rotate left while the inserted run allows it.
            while new_end > cursor && start > 0 && new_chars[start - 1] == new_chars[new_end - 1] {
                start -= 1;
                old_end -= 1;
                new_end -= 1;
            }
        } else if new_end == start {
            // Pure deletion.
            while start > cursor && start > 0 && old_chars[start - 1] == old_chars[old_end - 1] {
                start -= 1;
                old_end -= 1;
                new_end -= 1;
            }
        }
    }

    Some(TextDiff {
        start,
        old_end,
        inserted: new_chars[start..new_end].iter().collect(),
    })
}

/// Convert a UTF-16 code unit offset into a char offset.
///
/// Offsets past the end clamp to the char length. An offset that falls
/// between the two halves of a surrogate pair rounds down to the start of
/// that char.
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (char_idx, c) in text.chars().enumerate() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return char_idx;
        }
        units = next;
    }
    text.chars().count()
}

/// Convert a char offset into a UTF-16 code unit offset.
///
/// Offsets past the end clamp to the UTF-16 length.
pub fn char_to_utf16_offset(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Length of `text` in chars.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_equal() {
        assert_eq!(diff_text("hello", "hello", None), None);
    }

    #[test]
    fn test_diff_paste_in_middle() {
        let diff = diff_text("hello world", "hello big world", None).unwrap();
        assert_eq!(diff.start, 6);
        assert_eq!(diff.old_end, 6);
        assert_eq!(diff.inserted, "big ");
    }

    #[test]
    fn test_diff_selection_overwrite() {
        // "world" selected and replaced by "rust"
        let diff = diff_text("hello world", "hello rust", None).unwrap();
        assert_eq!(diff.start, 6);
        assert_eq!(diff.old_end, 11);
        assert_eq!(diff.inserted, "rust");
    }

    #[test]
    fn test_diff_cut() {
        let diff = diff_text("abcdef", "af", None).unwrap();
        assert_eq!(diff.start, 1);
        assert_eq!(diff.old_end, 5);
        assert_eq!(diff.inserted, "");
    }

    #[test]
    fn test_diff_ambiguous_insert_uses_cursor() {
        // Typing "a" at the very start of "aaa".
        let diff = diff_text("aaa", "aaaa", Some(1)).unwrap();
        assert_eq!(diff.start, 0);
        assert_eq!(diff.inserted, "a");

        // Without a hint the canonical diff lands at the end.
        let diff = diff_text("aaa", "aaaa", None).unwrap();
        assert_eq!(diff.start, 3);
    }

    #[test]
    fn test_diff_ambiguous_delete_uses_cursor() {
        // Forward delete at offset 1 of "xaaay".
        let diff = diff_text("xaaay", "xaay", Some(1)).unwrap();
        assert_eq!(diff.start, 1);
        assert_eq!(diff.old_end, 2);
    }

    #[test]
    fn test_diff_multibyte() {
        let diff = diff_text("héllo", "héllo🌍", None).unwrap();
        assert_eq!(diff.start, 5);
        assert_eq!(diff.inserted, "🌍");
    }

    #[test]
    fn test_utf16_offsets() {
        // 🌍 is one char but two UTF-16 units.
        let text = "a🌍b";
        assert_eq!(char_to_utf16_offset(text, 0), 0);
        assert_eq!(char_to_utf16_offset(text, 1), 1);
        assert_eq!(char_to_utf16_offset(text, 2), 3);
        assert_eq!(char_to_utf16_offset(text, 3), 4);
        assert_eq!(char_to_utf16_offset(text, 10), 4);

        assert_eq!(utf16_to_char_offset(text, 0), 0);
        assert_eq!(utf16_to_char_offset(text, 1), 1);
        // Inside the surrogate pair rounds down.
        assert_eq!(utf16_to_char_offset(text, 2), 1);
        assert_eq!(utf16_to_char_offset(text, 3), 2);
        assert_eq!(utf16_to_char_offset(text, 4), 3);
        assert_eq!(utf16_to_char_offset(text, 99), 3);
    }

    #[test]
    fn test_char_len() {
        assert_eq!(char_len("hello 🌍"), 7);
    }
}
