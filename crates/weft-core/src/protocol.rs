//! Wire protocol between editor clients and the synchronization authority.
//!
//! Clients send `text_operation` events carrying an [`EditOperation`]; the
//! authority answers every accepted operation by pushing a `doc_update` event
//! carrying a [`CanonicalUpdate`] to all connected clients.
//!
//! On a socket both directions use the envelope
//! `{"event": "<name>", "payload": {...}}`.

use serde::{Deserialize, Serialize};

use crate::text::TextBuffer;

/// Event name for client → server edit operations.
pub const TEXT_OPERATION_EVENT: &str = "text_operation";

/// Event name for server → client canonical updates.
pub const DOC_UPDATE_EVENT: &str = "doc_update";

/// A minimal edit produced from one input event.
///
/// Offsets are char offsets into the sender's local replica at the time the
/// operation was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EditOperation {
    /// Insert `ch` immediately before position `at`: the receiver inserts it
    /// at char offset `at - 1` (saturating), so `at` is the caret after the
    /// insert, not the insertion index.
    Insert {
        at: usize,
        #[serde(rename = "char")]
        ch: char,
    },
    /// Remove the character immediately before position `at`.
    Delete { at: usize },
    /// Replace the chars in `from..to` with `text`.
    Replace { from: usize, to: usize, text: String },
}

/// Result of applying an operation to an authoritative buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Where the originator's caret belongs after the edit.
    pub cursor_hint: usize,
    /// Whether any offset had to be clamped into the document.
    pub clamped: bool,
    /// Whether the buffer actually changed.
    pub changed: bool,
}

impl EditOperation {
    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Replace { .. } => "replace",
        }
    }

    /// Apply this operation to `buf`, interpreting offsets against its
    /// current content.
    ///
    /// Offsets beyond the buffer are clamped rather than rejected: a stale
    /// offset from a slow client lands at the nearest valid position.
    pub fn apply_to<B: TextBuffer>(&self, buf: &mut B) -> Applied {
        let len = buf.len_chars();
        match self {
            Self::Insert { at, ch } => {
                let pos = at.saturating_sub(1);
                let clamped = pos > len;
                let pos = pos.min(len);
                let mut tmp = [0u8; 4];
                buf.insert(pos, ch.encode_utf8(&mut tmp));
                Applied {
                    cursor_hint: pos + 1,
                    clamped,
                    changed: true,
                }
            }
            Self::Delete { at } => {
                let clamped = *at > len;
                let at = (*at).min(len);
                if at == 0 {
                    return Applied {
                        cursor_hint: 0,
                        clamped,
                        changed: false,
                    };
                }
                buf.delete(at - 1..at);
                Applied {
                    cursor_hint: at - 1,
                    clamped,
                    changed: true,
                }
            }
            Self::Replace { from, to, text } => {
                let (start, end) = if from <= to { (*from, *to) } else { (*to, *from) };
                let clamped = end > len;
                let start = start.min(len);
                let end = end.min(len);
                let changed = start != end || !text.is_empty();
                if changed {
                    buf.replace(start..end, text);
                }
                Applied {
                    cursor_hint: start + text.chars().count(),
                    clamped,
                    changed,
                }
            }
        }
    }

    /// Serialize the operation payload to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an operation payload from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Canonical document state pushed by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalUpdate {
    /// Full authoritative document text.
    pub document: String,
    /// Where the receiving client's caret should go, or `None` to keep the
    /// client's current selection.
    pub cursor_pos: Option<usize>,
    /// Authority revision this snapshot reflects. Monotonic within an epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    /// Identifies one run of the authority. Revisions restart from zero when
    /// it changes, so they are only comparable within the same epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u64>,
}

impl CanonicalUpdate {
    pub fn new(document: impl Into<String>, cursor_pos: Option<usize>) -> Self {
        Self {
            document: document.into(),
            cursor_pos,
            revision: None,
            epoch: None,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Serialize the update payload to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an update payload from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Client → server socket messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ClientEvent {
    TextOperation(EditOperation),
}

/// Server → client socket messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    DocUpdate(CanonicalUpdate),
}

impl ClientEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::EditorRope;

    #[test]
    fn test_insert_wire_format() {
        let op = EditOperation::Insert { at: 3, ch: 'l' };
        insta::assert_snapshot!(op.to_json().unwrap(), @r#"{"type":"insert","at":3,"char":"l"}"#);
    }

    #[test]
    fn test_delete_wire_format() {
        let op = EditOperation::Delete { at: 4 };
        insta::assert_snapshot!(op.to_json().unwrap(), @r#"{"type":"delete","at":4}"#);
    }

    #[test]
    fn test_replace_wire_format() {
        let op = EditOperation::Replace {
            from: 6,
            to: 11,
            text: "rust".into(),
        };
        insta::assert_snapshot!(op.to_json().unwrap(), @r#"{"type":"replace","from":6,"to":11,"text":"rust"}"#);
    }

    #[test]
    fn test_char_must_be_single() {
        assert!(EditOperation::from_json(r#"{"type":"insert","at":1,"char":"ab"}"#).is_err());
    }

    #[test]
    fn test_doc_update_null_cursor() {
        let update = CanonicalUpdate::new("hello world", None);
        insta::assert_snapshot!(update.to_json().unwrap(), @r#"{"document":"hello world","cursor_pos":null}"#);

        let parsed = CanonicalUpdate::from_json(r#"{"document":"abc","cursor_pos":2}"#).unwrap();
        assert_eq!(parsed, CanonicalUpdate::new("abc", Some(2)));
        assert_eq!(parsed.revision, None);
        assert_eq!(parsed.epoch, None);
    }

    #[test]
    fn test_doc_update_with_epoch() {
        let update = CanonicalUpdate::new("x", None).with_revision(3).with_epoch(9);
        insta::assert_snapshot!(update.to_json().unwrap(), @r#"{"document":"x","cursor_pos":null,"revision":3,"epoch":9}"#);
    }

    #[test]
    fn test_envelopes() {
        let event = ClientEvent::TextOperation(EditOperation::Delete { at: 4 });
        insta::assert_snapshot!(
            event.to_json().unwrap(),
            @r#"{"event":"text_operation","payload":{"type":"delete","at":4}}"#
        );

        let event = ServerEvent::DocUpdate(CanonicalUpdate::new("hi", Some(2)).with_revision(7));
        insta::assert_snapshot!(
            event.to_json().unwrap(),
            @r#"{"event":"doc_update","payload":{"document":"hi","cursor_pos":2,"revision":7}}"#
        );

        let parsed = ClientEvent::from_json(
            r#"{"event":"text_operation","payload":{"type":"insert","at":1,"char":"x"}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            ClientEvent::TextOperation(EditOperation::Insert { at: 1, ch: 'x' })
        );
    }

    #[test]
    fn test_apply_insert_and_delete() {
        let mut doc = EditorRope::from_str("helo");
        let applied = EditOperation::Insert { at: 4, ch: 'l' }.apply_to(&mut doc);
        assert_eq!(doc.to_string(), "hello");
        assert_eq!(applied.cursor_hint, 4);
        assert!(!applied.clamped);

        let applied = EditOperation::Delete { at: 4 }.apply_to(&mut doc);
        assert_eq!(doc.to_string(), "helo");
        assert_eq!(applied.cursor_hint, 3);
    }

    #[test]
    fn test_apply_clamps_stale_offsets() {
        let mut doc = EditorRope::from_str("ab");
        let applied = EditOperation::Insert { at: 10, ch: 'c' }.apply_to(&mut doc);
        assert_eq!(doc.to_string(), "abc");
        assert!(applied.clamped);

        let applied = EditOperation::Delete { at: 0 }.apply_to(&mut doc);
        assert!(!applied.changed);
        assert_eq!(doc.to_string(), "abc");

        let applied = EditOperation::Replace {
            from: 1,
            to: 50,
            text: "Z".into(),
        }
        .apply_to(&mut doc);
        assert_eq!(doc.to_string(), "aZ");
        assert_eq!(applied.cursor_hint, 2);
        assert!(applied.clamped);
    }
}
