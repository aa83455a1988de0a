//! Ledger of persistence requests and their outcomes.

use crate::shapes::ShapeId;
use crate::store::ShapeKey;
use std::collections::VecDeque;

/// Maximum number of completed entries kept for inspection.
pub const MAX_OUTBOX_HISTORY: usize = 100;

/// What a request is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxOp {
    /// Initial load of all shapes.
    Fetch,
    /// Save of a committed draft.
    Create { key: ShapeKey },
    /// Removal of a deleted shape. `id` is `None` while the shape's create
    /// has not been acknowledged.
    Delete { key: ShapeKey, id: Option<ShapeId> },
}

/// Lifecycle of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxStatus {
    /// Sent, waiting for the outcome.
    Pending,
    /// Confirmed by the service.
    Acked,
    /// The service call failed. Local state was kept.
    Failed(String),
    /// Waiting on another request before it can be sent.
    Deferred,
    /// Never sent; the change is local only.
    Skipped(String),
}

impl OutboxStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, OutboxStatus::Pending | OutboxStatus::Deferred)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub seq: u64,
    pub op: OutboxOp,
    pub status: OutboxStatus,
}

/// Ordered record of every persistence request.
///
/// Nothing here rolls local state back; the outbox only makes divergence
/// between local and remote state observable.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    entries: VecDeque<OutboxEntry>,
    next_seq: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, op: OutboxOp, status: OutboxStatus) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.entries.push_back(OutboxEntry { seq, op, status });
        self.prune();
        seq
    }

    /// Record a request about to be sent.
    pub fn enqueue(&mut self, op: OutboxOp) -> u64 {
        self.push(op, OutboxStatus::Pending)
    }

    /// Record a request that must wait for another one.
    pub fn defer(&mut self, op: OutboxOp) -> u64 {
        self.push(op, OutboxStatus::Deferred)
    }

    /// Record a change that will never reach the service.
    pub fn skip(&mut self, op: OutboxOp, reason: impl Into<String>) -> u64 {
        self.push(op, OutboxStatus::Skipped(reason.into()))
    }

    pub fn get(&self, seq: u64) -> Option<&OutboxEntry> {
        self.entries.iter().find(|e| e.seq == seq)
    }

    fn get_mut(&mut self, seq: u64) -> Option<&mut OutboxEntry> {
        self.entries.iter_mut().find(|e| e.seq == seq)
    }

    /// Mark a request as confirmed.
    pub fn mark_acked(&mut self, seq: u64) -> Option<&OutboxEntry> {
        self.set_status(seq, OutboxStatus::Acked)
    }

    /// Mark a request as failed.
    pub fn mark_failed(&mut self, seq: u64, reason: impl Into<String>) -> Option<&OutboxEntry> {
        self.set_status(seq, OutboxStatus::Failed(reason.into()))
    }

    /// Mark a request as never sent.
    pub fn mark_skipped(&mut self, seq: u64, reason: impl Into<String>) -> Option<&OutboxEntry> {
        self.set_status(seq, OutboxStatus::Skipped(reason.into()))
    }

    fn set_status(&mut self, seq: u64, status: OutboxStatus) -> Option<&OutboxEntry> {
        let entry = self.get_mut(seq)?;
        entry.status = status;
        let entry: &OutboxEntry = entry;
        Some(entry)
    }

    /// Whether a create for this shape is still waiting on the service.
    pub fn has_pending_create(&self, key: ShapeKey) -> bool {
        self.entries.iter().any(|e| {
            e.status == OutboxStatus::Pending
                && matches!(e.op, OutboxOp::Create { key: k } if k == key)
        })
    }

    /// Sequence number of a deferred delete for this shape.
    pub fn deferred_delete(&self, key: ShapeKey) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| {
                e.status == OutboxStatus::Deferred
                    && matches!(e.op, OutboxOp::Delete { key: k, .. } if k == key)
            })
            .map(|e| e.seq)
    }

    /// Fill in the id of a deferred delete and mark it pending.
    pub fn activate_delete(&mut self, seq: u64, id: ShapeId) -> bool {
        match self.get_mut(seq) {
            Some(entry) if entry.status == OutboxStatus::Deferred => {
                if let OutboxOp::Delete { id: slot, .. } = &mut entry.op {
                    *slot = Some(id);
                    entry.status = OutboxStatus::Pending;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &OutboxEntry> {
        self.entries.iter()
    }

    /// Entries still waiting on the service.
    pub fn open(&self) -> impl Iterator<Item = &OutboxEntry> {
        self.entries.iter().filter(|e| e.status.is_open())
    }

    /// Entries whose service call failed.
    pub fn failed(&self) -> impl Iterator<Item = &OutboxEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, OutboxStatus::Failed(_)))
    }

    /// Whether any request failed, i.e. remote state may be stale.
    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the oldest completed entries beyond the history limit.
    fn prune(&mut self) {
        let mut closed = self.entries.iter().filter(|e| !e.status.is_open()).count();
        while closed > MAX_OUTBOX_HISTORY {
            match self.entries.iter().position(|e| !e.status.is_open()) {
                Some(pos) => {
                    self.entries.remove(pos);
                    closed -= 1;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind};
    use crate::store::ShapeStore;
    use kurbo::Point;

    fn key() -> ShapeKey {
        let mut store = ShapeStore::new();
        store.insert(Shape::at(ShapeKind::Line, Point::ZERO))
    }

    #[test]
    fn test_enqueue_and_ack() {
        let mut outbox = Outbox::new();
        let seq = outbox.enqueue(OutboxOp::Fetch);
        assert_eq!(outbox.open().count(), 1);
        outbox.mark_acked(seq);
        assert_eq!(outbox.get(seq).unwrap().status, OutboxStatus::Acked);
        assert_eq!(outbox.open().count(), 0);
        assert!(!outbox.has_failures());
    }

    #[test]
    fn test_failures_are_visible() {
        let mut outbox = Outbox::new();
        let seq = outbox.enqueue(OutboxOp::Fetch);
        outbox.mark_failed(seq, "offline");
        assert!(outbox.has_failures());
        assert_eq!(outbox.failed().count(), 1);
    }

    #[test]
    fn test_deferred_delete_activation() {
        let mut outbox = Outbox::new();
        let key = key();
        let create = outbox.enqueue(OutboxOp::Create { key });
        assert!(outbox.has_pending_create(key));

        let delete = outbox.defer(OutboxOp::Delete { key, id: None });
        assert_eq!(outbox.deferred_delete(key), Some(delete));

        outbox.mark_acked(create);
        assert!(!outbox.has_pending_create(key));
        assert!(outbox.activate_delete(delete, "id-1".to_string()));
        let entry = outbox.get(delete).unwrap();
        assert_eq!(entry.status, OutboxStatus::Pending);
        assert_eq!(
            entry.op,
            OutboxOp::Delete {
                key,
                id: Some("id-1".to_string())
            }
        );
        assert_eq!(outbox.deferred_delete(key), None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut outbox = Outbox::new();
        let open = outbox.enqueue(OutboxOp::Fetch);
        for _ in 0..(MAX_OUTBOX_HISTORY + 20) {
            let seq = outbox.enqueue(OutboxOp::Fetch);
            outbox.mark_acked(seq);
        }
        // The newest entry is acked after its push, so one extra may linger.
        assert!(outbox.len() <= MAX_OUTBOX_HISTORY + 2);
        assert!(outbox.get(open).is_some());
    }
}
