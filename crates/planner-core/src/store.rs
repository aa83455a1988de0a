//! Ordered store of committed shapes.

use crate::geometry;
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;

/// Process-local handle for a stored shape.
///
/// Unlike indices, keys stay valid when other shapes are inserted or
/// removed, so asynchronous persistence outcomes can find their shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeKey(u64);

#[derive(Debug, Clone)]
struct Entry {
    key: ShapeKey,
    shape: Shape,
}

/// Committed shapes in insertion order, which is also paint order.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    entries: Vec<Entry>,
    next_key: u64,
}

impl ShapeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_key(&mut self) -> ShapeKey {
        let key = ShapeKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Append a shape and return its key.
    pub fn insert(&mut self, shape: Shape) -> ShapeKey {
        let key = self.allocate_key();
        self.entries.push(Entry { key, shape });
        key
    }

    /// Insert shapes at the front, keeping their relative order.
    ///
    /// Shapes whose id is already present are skipped. Returns the number of
    /// shapes inserted; existing indices shift up by that amount.
    pub fn prepend(&mut self, shapes: impl IntoIterator<Item = Shape>) -> usize {
        let mut fresh = Vec::new();
        for shape in shapes {
            let duplicate = shape.id.as_ref().is_some_and(|id| {
                self.contains_id(id)
                    || fresh.iter().any(|e: &Entry| e.shape.id.as_ref() == Some(id))
            });
            if duplicate {
                log::debug!("Skipping duplicate shape {:?}", shape.id);
                continue;
            }
            let key = self.allocate_key();
            fresh.push(Entry { key, shape });
        }
        let count = fresh.len();
        self.entries.splice(0..0, fresh);
        count
    }

    /// Remove the shape at `index`.
    pub fn remove(&mut self, index: usize) -> Option<(ShapeKey, Shape)> {
        if index < self.entries.len() {
            let entry = self.entries.remove(index);
            Some((entry.key, entry.shape))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.entries.get(index).map(|e| &e.shape)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.entries.get_mut(index).map(|e| &mut e.shape)
    }

    /// Key of the shape at `index`.
    pub fn key_at(&self, index: usize) -> Option<ShapeKey> {
        self.entries.get(index).map(|e| e.key)
    }

    /// Get a shape by key.
    pub fn get_by_key(&self, key: ShapeKey) -> Option<&Shape> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.shape)
    }

    /// Record the service id for a shape. Returns false if the shape is gone.
    pub fn assign_id(&mut self, key: ShapeKey, id: ShapeId) -> bool {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.shape.id = Some(id);
                true
            }
            None => false,
        }
    }

    /// Check whether a shape with this service id is stored.
    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.shape.id.as_deref() == Some(id))
    }

    /// Shapes in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.entries.iter().map(|e| &e.shape)
    }

    /// Index of the first shape containing `point`.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        geometry::hit_test(self.iter(), point)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
