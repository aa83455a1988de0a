//! Mirroring of shape edits to the remote shape service.
//!
//! Local edits are applied first and never rolled back. Requests are handed
//! to a background [`PersistenceClient`] and their outcome is tracked in an
//! [`Outbox`] so that divergence between local and remote state is visible.

mod client;
mod http;
mod memory;
mod outbox;
mod record;

pub use client::{PersistEvent, PersistOutcome, PersistRequest, PersistenceClient};
pub use http::HttpShapeService;
pub use memory::MemoryShapeService;
pub use outbox::{MAX_OUTBOX_HISTORY, Outbox, OutboxEntry, OutboxOp, OutboxStatus};
pub use record::{RecordError, ShapeRecord, decode_records};

use thiserror::Error;

/// Shape service errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Service returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Could not decode response: {0}")]
    Decode(String),
    #[error("Shape not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Backend holding the persisted shape records.
///
/// Calls block; the editor only invokes them from the persistence worker
/// thread.
pub trait ShapeService: Send + Sync {
    /// Fetch every stored record.
    fn list(&self) -> ServiceResult<Vec<ShapeRecord>>;

    /// Store a new record and return it with its assigned id.
    fn create(&self, record: &ShapeRecord) -> ServiceResult<ShapeRecord>;

    /// Delete the record with the given id.
    fn delete(&self, id: &str) -> ServiceResult<()>;
}
