//! In-process shape storage.

use dashmap::DashMap;
use planner_core::persistence::{RecordError, ShapeRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

struct StoredShape {
    /// Insertion sequence, used to list records in creation order.
    seq: u64,
    record: ShapeRecord,
}

/// Shape records keyed by id.
#[derive(Default)]
pub struct ShapeDb {
    shapes: DashMap<String, StoredShape>,
    next_seq: AtomicU64,
}

impl ShapeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in creation order.
    pub fn list(&self) -> Vec<ShapeRecord> {
        let mut stored: Vec<(u64, ShapeRecord)> = self
            .shapes
            .iter()
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        stored.sort_by_key(|(seq, _)| *seq);
        stored.into_iter().map(|(_, record)| record).collect()
    }

    /// Store a record under a fresh id. Any id supplied by the client is ignored.
    pub fn insert(&self, record: ShapeRecord) -> Result<ShapeRecord, RecordError> {
        if !record.is_finite() {
            return Err(RecordError::NonFinite { id: record.id });
        }
        let id = Uuid::new_v4().to_string();
        let record = ShapeRecord {
            id: Some(id.clone()),
            ..record
        };
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.shapes.insert(
            id,
            StoredShape {
                seq,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    /// Remove a record, returning it if it existed.
    pub fn remove(&self, id: &str) -> Option<ShapeRecord> {
        self.shapes.remove(id).map(|(_, stored)| stored.record)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
