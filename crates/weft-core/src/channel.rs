//! Outbound side of the message channel, as seen by edit capture.
//!
//! Transport setup (handshake, reconnect, buffering) belongs to the
//! implementor. Capture only needs somewhere to push one operation at a time.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ChannelError;
use crate::protocol::EditOperation;

/// Somewhere edit operations can be sent.
///
/// Sends are fire-and-forget: implementations must not block waiting for a
/// reply. Errors are reported, never retried by the caller.
pub trait OperationSink {
    fn push_operation(&mut self, op: &EditOperation) -> Result<(), ChannelError>;
}

impl<S: OperationSink + ?Sized> OperationSink for Box<S> {
    fn push_operation(&mut self, op: &EditOperation) -> Result<(), ChannelError> {
        (**self).push_operation(op)
    }
}

impl<S: OperationSink + ?Sized> OperationSink for &mut S {
    fn push_operation(&mut self, op: &EditOperation) -> Result<(), ChannelError> {
        (**self).push_operation(op)
    }
}

/// In-memory sink that records everything pushed to it.
///
/// Clones share the same log, so a test can keep one handle while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sent: Rc<RefCell<Vec<EditOperation>>>,
    fail_with: Rc<RefCell<Option<ChannelError>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything pushed so far, in order.
    pub fn sent(&self) -> Vec<EditOperation> {
        self.sent.borrow().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<EditOperation> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    /// Make subsequent sends fail with `err` (or succeed again with `None`).
    pub fn fail_with(&self, err: Option<ChannelError>) {
        *self.fail_with.borrow_mut() = err;
    }
}

impl OperationSink for RecordingSink {
    fn push_operation(&mut self, op: &EditOperation) -> Result<(), ChannelError> {
        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        self.sent.borrow_mut().push(op.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_shares_log() {
        let sink = RecordingSink::new();
        let mut handle = sink.clone();
        handle
            .push_operation(&EditOperation::Delete { at: 1 })
            .unwrap();
        assert_eq!(sink.sent(), vec![EditOperation::Delete { at: 1 }]);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.sent().is_empty());
    }

    #[test]
    fn test_recording_sink_failure() {
        let mut sink = RecordingSink::new();
        sink.fail_with(Some(ChannelError::Closed));
        let err = sink
            .push_operation(&EditOperation::Delete { at: 1 })
            .unwrap_err();
        assert_eq!(err, ChannelError::Closed);
        assert!(sink.sent().is_empty());
    }
}
