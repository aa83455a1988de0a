//! Wire representation of a shape.

use crate::shapes::{Shape, ShapeId, ShapeKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record errors.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Record {id:?} has non-finite coordinates")]
    NonFinite { id: Option<ShapeId> },
    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// A shape as exchanged with the shape service:
/// `{ id, type, startX, startY, endX, endY }`.
///
/// `id` is omitted when creating. Document-store style `_id` is accepted when
/// decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ShapeId>,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl ShapeRecord {
    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// Whether all four coordinates are finite.
    pub fn is_finite(&self) -> bool {
        [self.start_x, self.start_y, self.end_x, self.end_y]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Copy of this record without its id (the body of a create request).
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}

impl TryFrom<serde_json::Value> for ShapeRecord {
    type Error = RecordError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(|e| RecordError::Malformed(e.to_string()))
    }
}

/// Decode a fetched list element by element, dropping the ones that do not
/// describe a shape.
pub fn decode_records(values: Vec<serde_json::Value>) -> Vec<ShapeRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match ShapeRecord::try_from(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Dropping fetched record #{}: {}", index, e);
                None
            }
        })
        .collect()
}

impl From<&Shape> for ShapeRecord {
    fn from(shape: &Shape) -> Self {
        Self {
            id: shape.id.clone(),
            kind: shape.kind(),
            start_x: shape.start.x,
            start_y: shape.start.y,
            end_x: shape.end.x,
            end_y: shape.end.y,
        }
    }
}

impl TryFrom<ShapeRecord> for Shape {
    type Error = RecordError;

    fn try_from(record: ShapeRecord) -> Result<Self, Self::Error> {
        if !record.is_finite() {
            return Err(RecordError::NonFinite { id: record.id });
        }
        let shape = Shape::new(record.kind, record.start(), record.end());
        Ok(match record.id {
            Some(id) => shape.with_id(id),
            None => shape,
        })
    }
}
