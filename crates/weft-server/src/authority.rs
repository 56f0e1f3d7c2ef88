//! The synchronization authority.
//!
//! One task owns the document and the connection registry. Connection
//! handlers talk to it only through the mutation queue, so operations are
//! applied one at a time in arrival order. Offsets are interpreted against the
//! document as it is when the operation is dequeued; an operation built
//! against an older state may land in the wrong place.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use weft_core::{Applied, CanonicalUpdate, EditOperation, EditorRope, TextBuffer};

use crate::error::AuthorityError;

pub type ConnectionId = u64;

/// Updates buffered per connection before it is considered too slow and dropped.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

enum Command {
    Connect {
        reply: oneshot::Sender<Connection>,
    },
    Disconnect {
        id: ConnectionId,
    },
    Apply {
        origin: ConnectionId,
        op: EditOperation,
    },
    Snapshot {
        reply: oneshot::Sender<CanonicalUpdate>,
    },
    ConnectionCount {
        reply: oneshot::Sender<usize>,
    },
}

/// A registered connection and the stream of updates pushed to it.
///
/// The first update is always the current snapshot with no cursor hint. The
/// stream ends when the authority drops the connection, either on disconnect
/// or because the receiver fell a full buffer behind.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub updates: mpsc::Receiver<CanonicalUpdate>,
}

/// Cloneable handle to a running authority.
#[derive(Debug, Clone)]
pub struct AuthorityHandle {
    tx: mpsc::Sender<Command>,
}

impl AuthorityHandle {
    pub async fn connect(&self) -> Result<Connection, AuthorityError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Connect { reply }).await?;
        Ok(rx.await?)
    }

    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), AuthorityError> {
        self.tx.send(Command::Disconnect { id }).await?;
        Ok(())
    }

    /// Queue `op` from connection `origin`. Returns once the op is enqueued.
    pub async fn apply(&self, origin: ConnectionId, op: EditOperation) -> Result<(), AuthorityError> {
        self.tx.send(Command::Apply { origin, op }).await?;
        Ok(())
    }

    /// Current document and revision, without a cursor hint.
    pub async fn snapshot(&self) -> Result<CanonicalUpdate, AuthorityError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot { reply }).await?;
        Ok(rx.await?)
    }

    pub async fn connection_count(&self) -> Result<usize, AuthorityError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::ConnectionCount { reply }).await?;
        Ok(rx.await?)
    }
}

/// The authoritative document and everyone watching it.
#[derive(Debug)]
pub struct Authority {
    document: EditorRope,
    revision: u64,
    /// Identifies this run; revisions restart from 0 under a new epoch.
    epoch: u64,
    outbound_capacity: usize,
    connections: HashMap<ConnectionId, mpsc::Sender<CanonicalUpdate>>,
    next_id: ConnectionId,
}

impl Authority {
    pub fn new(initial: &str) -> Self {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            document: EditorRope::from_str(initial),
            revision: 0,
            epoch,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            connections: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Buffer at most `capacity` updates per connection (minimum 1).
    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(1);
        self
    }

    /// Move the authority onto its own task, fed by a queue of `capacity`.
    ///
    /// The task exits once every handle has been dropped.
    pub fn spawn(self, capacity: usize) -> (AuthorityHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let task = tokio::spawn(self.run(rx));
        (AuthorityHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!(len = self.document.len_chars(), epoch = self.epoch, "authority started");
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        info!(revision = self.revision, "authority queue closed, stopping");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Connect { reply } => {
                let connection = self.register();
                let id = connection.id;
                if reply.send(connection).is_err() {
                    self.connections.remove(&id);
                }
            }
            Command::Disconnect { id } => {
                if self.connections.remove(&id).is_some() {
                    debug!(id, remaining = self.connections.len(), "connection closed");
                }
            }
            Command::Apply { origin, op } => {
                self.apply(origin, &op);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::ConnectionCount { reply } => {
                let _ = reply.send(self.connections.len());
            }
        }
    }

    /// Register a connection and queue the current snapshot on it.
    pub fn register(&mut self) -> Connection {
        let id = self.next_id;
        self.next_id += 1;
        let (outbound, updates) = mpsc::channel(self.outbound_capacity);
        match outbound.try_send(self.snapshot()) {
            Ok(()) => {
                self.connections.insert(id, outbound);
                debug!(id, total = self.connections.len(), "connection registered");
            }
            Err(e) => warn!(id, error = %e, "could not queue snapshot, not registering"),
        }
        Connection { id, updates }
    }

    /// Apply one operation and push the result to every connection.
    ///
    /// Every operation bumps the revision and broadcasts, including no-ops,
    /// so the originator is corrected even when nothing changed.
    pub fn apply(&mut self, origin: ConnectionId, op: &EditOperation) -> Applied {
        let applied = op.apply_to(&mut self.document);
        self.revision += 1;

        if applied.clamped {
            warn!(origin, ?op, len = self.document.len_chars(), "operation offset clamped into document");
        }
        trace!(
            origin,
            kind = op.kind(),
            revision = self.revision,
            edit = ?self.document.last_edit().filter(|_| applied.changed),
            "applied operation"
        );

        self.broadcast(origin, applied.cursor_hint);
        applied
    }

    /// Queue the current document on every connection.
    ///
    /// Never waits: a connection whose buffer is full is dropped, and its
    /// client resynchronizes from the snapshot on reconnect.
    fn broadcast(&mut self, origin: ConnectionId, cursor_hint: usize) {
        let document = self.document.to_string();
        let (revision, epoch, capacity) = (self.revision, self.epoch, self.outbound_capacity);
        self.connections.retain(|&id, outbound| {
            let cursor_pos = (id == origin).then_some(cursor_hint);
            let update = CanonicalUpdate::new(document.clone(), cursor_pos)
                .with_revision(revision)
                .with_epoch(epoch);
            match outbound.try_send(update) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(id, capacity, "connection fell behind, dropping");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(id, "pruning closed connection");
                    false
                }
            }
        });
    }

    pub fn snapshot(&self) -> CanonicalUpdate {
        CanonicalUpdate::new(self.document.to_string(), None)
            .with_revision(self.revision)
            .with_epoch(self.epoch)
    }

    pub fn document(&self) -> String {
        self.document.to_string()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(authority: &mut Authority) -> (ConnectionId, mpsc::Receiver<CanonicalUpdate>) {
        let mut connection = authority.register();
        // Drain the initial snapshot.
        connection.updates.try_recv().unwrap();
        (connection.id, connection.updates)
    }

    #[test]
    fn test_register_sends_snapshot() {
        let mut authority = Authority::new("seed").with_epoch(3);
        let mut connection = authority.register();
        let snapshot = connection.updates.try_recv().unwrap();
        assert_eq!(snapshot.document, "seed");
        assert_eq!(snapshot.cursor_pos, None);
        assert_eq!(snapshot.revision, Some(0));
        assert_eq!(snapshot.epoch, Some(3));
    }

    #[test]
    fn test_cursor_hint_only_for_originator() {
        let mut authority = Authority::new("helo");
        let (a, mut rx_a) = connect(&mut authority);
        let (_b, mut rx_b) = connect(&mut authority);

        authority.apply(a, &EditOperation::Insert { at: 4, ch: 'l' });

        let to_a = rx_a.try_recv().unwrap();
        let to_b = rx_b.try_recv().unwrap();
        assert_eq!(to_a.document, "hello");
        assert_eq!(to_a.cursor_pos, Some(4));
        assert_eq!(to_b.document, "hello");
        assert_eq!(to_b.cursor_pos, None);
        assert_eq!(to_a.revision, Some(1));
        assert_eq!(to_b.revision, Some(1));
    }

    #[test]
    fn test_delete_semantics() {
        let mut authority = Authority::new("hello");
        let (a, mut rx) = connect(&mut authority);

        authority.apply(a, &EditOperation::Delete { at: 4 });
        let update = rx.try_recv().unwrap();
        assert_eq!(update.document, "helo");
        assert_eq!(update.cursor_pos, Some(3));

        // Deleting before the start changes nothing but still answers.
        authority.apply(a, &EditOperation::Delete { at: 0 });
        let update = rx.try_recv().unwrap();
        assert_eq!(update.document, "helo");
        assert_eq!(update.cursor_pos, Some(0));
        assert_eq!(update.revision, Some(2));
    }

    #[test]
    fn test_arrival_order_wins() {
        // Two clients both think the document is "ab" and type at the end.
        let mut authority = Authority::new("ab");
        let (a, _rx_a) = connect(&mut authority);
        let (b, _rx_b) = connect(&mut authority);

        authority.apply(a, &EditOperation::Insert { at: 3, ch: 'x' });
        authority.apply(b, &EditOperation::Insert { at: 3, ch: 'y' });
        assert_eq!(authority.document(), "abyx");
        assert_eq!(authority.revision(), 2);
    }

    #[test]
    fn test_stale_offset_is_clamped() {
        let mut authority = Authority::new("abc");
        let (a, mut rx) = connect(&mut authority);
        let applied = authority.apply(
            a,
            &EditOperation::Replace {
                from: 2,
                to: 10,
                text: "Z".into(),
            },
        );
        assert!(applied.clamped);
        assert_eq!(rx.try_recv().unwrap().document, "abZ");
    }

    #[test]
    fn test_closed_connections_pruned() {
        let mut authority = Authority::new("");
        let (a, _rx_a) = connect(&mut authority);
        let (_b, rx_b) = connect(&mut authority);
        drop(rx_b);
        assert_eq!(authority.connection_count(), 2);

        authority.apply(a, &EditOperation::Insert { at: 1, ch: 'q' });
        assert_eq!(authority.connection_count(), 1);
    }

    #[test]
    fn test_slow_connection_dropped_when_buffer_full() {
        let mut authority = Authority::new("").with_outbound_capacity(2);
        let (a, mut rx_a) = connect(&mut authority);
        // Never read from; the snapshot already takes one slot.
        let mut slow = authority.register();

        authority.apply(a, &EditOperation::Insert { at: 1, ch: 'x' });
        assert_eq!(authority.connection_count(), 2);
        authority.apply(a, &EditOperation::Insert { at: 2, ch: 'y' });
        assert_eq!(authority.connection_count(), 1);

        // The reader kept up and sees both revisions.
        assert_eq!(rx_a.try_recv().unwrap().revision, Some(1));
        assert_eq!(rx_a.try_recv().unwrap().revision, Some(2));

        // The slow one gets what was buffered, then the stream ends.
        assert_eq!(slow.updates.try_recv().unwrap().revision, Some(0));
        assert_eq!(slow.updates.try_recv().unwrap().revision, Some(1));
        assert!(matches!(
            slow.updates.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_updates_carry_epoch() {
        let mut authority = Authority::new("ab").with_epoch(11);
        let (a, mut rx) = connect(&mut authority);
        authority.apply(a, &EditOperation::Delete { at: 2 });
        assert_eq!(
            rx.try_recv().unwrap(),
            CanonicalUpdate::new("a", Some(1)).with_revision(1).with_epoch(11)
        );
        assert_eq!(authority.snapshot().epoch, Some(11));
    }

    #[tokio::test]
    async fn test_spawned_authority_round_trip() {
        let (handle, task) = Authority::new("helo").with_epoch(7).spawn(16);

        let mut a = handle.connect().await.unwrap();
        let mut b = handle.connect().await.unwrap();
        assert_eq!(a.updates.recv().await.unwrap().document, "helo");
        assert_eq!(b.updates.recv().await.unwrap().document, "helo");

        handle
            .apply(a.id, EditOperation::Insert { at: 4, ch: 'l' })
            .await
            .unwrap();
        let to_a = a.updates.recv().await.unwrap();
        let to_b = b.updates.recv().await.unwrap();
        assert_eq!(
            to_a,
            CanonicalUpdate::new("hello", Some(4)).with_revision(1).with_epoch(7)
        );
        assert_eq!(
            to_b,
            CanonicalUpdate::new("hello", None).with_revision(1).with_epoch(7)
        );
        assert_eq!(handle.connection_count().await.unwrap(), 2);

        handle.disconnect(b.id).await.unwrap();
        handle
            .apply(a.id, EditOperation::Delete { at: 5 })
            .await
            .unwrap();
        assert_eq!(a.updates.recv().await.unwrap().document, "hell");
        // b's sender was dropped by the authority.
        assert!(b.updates.recv().await.is_none());

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.revision, Some(2));

        drop(handle);
        task.await.unwrap();
    }
}
