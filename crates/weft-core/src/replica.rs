//! The client's local copy of the document.

use crate::text::{EditorRope, TextBuffer};

/// A client's possibly-stale copy of the authoritative document.
///
/// Edit capture diffs input events against it and advances it to the
/// post-edit value; reconciliation overwrites it wholesale. It is never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct LocalReplica {
    text: EditorRope,
    /// Highest authority revision applied so far, if the authority sends them.
    revision: Option<u64>,
    /// Authority epoch `revision` belongs to.
    epoch: Option<u64>,
    /// Operations sent since the last applied canonical update.
    pending: usize,
}

impl LocalReplica {
    /// Seed a replica from the initial document.
    pub fn new(initial: &str) -> Self {
        Self {
            text: EditorRope::from_str(initial),
            revision: None,
            epoch: None,
            pending: 0,
        }
    }

    /// The replica text.
    pub fn text(&self) -> &EditorRope {
        &self.text
    }

    /// The replica text as a String.
    pub fn content(&self) -> String {
        self.text.to_string()
    }

    /// Length in chars.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// Forget the known revision and epoch, so the next update is applied
    /// whatever revision it carries.
    pub fn reset_revision(&mut self) {
        self.revision = None;
        self.epoch = None;
    }

    /// Number of locally sent operations not yet followed by a canonical update.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Record an optimistic local edit that has been sent.
    pub(crate) fn advance_local(&mut self, value: &str) {
        if !self.text.content_eq(value) {
            self.text.set_contents(value);
        }
        self.pending += 1;
    }

    /// Adopt a value observed on the surface without sending anything.
    pub(crate) fn adopt_local(&mut self, value: &str) {
        if !self.text.content_eq(value) {
            self.text.set_contents(value);
        }
    }

    /// Overwrite with canonical state.
    ///
    /// A new epoch replaces the known revision outright; within an epoch a
    /// missing revision keeps the last known one.
    pub(crate) fn overwrite(&mut self, document: &str, revision: Option<u64>, epoch: Option<u64>) {
        if !self.text.content_eq(document) {
            self.text.set_contents(document);
        }
        if epoch.is_some() && epoch != self.epoch {
            self.epoch = epoch;
            self.revision = revision;
        } else if revision.is_some() {
            self.revision = revision;
        }
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_resets_pending() {
        let mut replica = LocalReplica::new("abc");
        replica.advance_local("abcd");
        replica.advance_local("abcde");
        assert_eq!(replica.pending(), 2);
        assert_eq!(replica.content(), "abcde");

        replica.overwrite("xyz", Some(3), None);
        assert_eq!(replica.content(), "xyz");
        assert_eq!(replica.pending(), 0);
        assert_eq!(replica.revision(), Some(3));

        // Updates without a revision keep the last known one.
        replica.overwrite("xy", None, None);
        assert_eq!(replica.revision(), Some(3));
    }

    #[test]
    fn test_new_epoch_replaces_revision() {
        let mut replica = LocalReplica::new("");
        replica.overwrite("a", Some(57), Some(1));
        replica.overwrite("b", Some(0), Some(2));
        assert_eq!(replica.revision(), Some(0));
        assert_eq!(replica.epoch(), Some(2));

        replica.reset_revision();
        assert_eq!(replica.revision(), None);
        assert_eq!(replica.epoch(), None);
        assert_eq!(replica.content(), "b");
    }
}
