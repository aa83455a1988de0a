//! In-memory shape service.

use super::{ServiceError, ServiceResult, ShapeRecord, ShapeService};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory service for tests and offline use.
///
/// Can be switched unavailable to simulate network failures.
pub struct MemoryShapeService {
    records: RwLock<Vec<ShapeRecord>>,
    next_id: AtomicU64,
    available: AtomicBool,
}

impl Default for MemoryShapeService {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryShapeService {
    /// Create a new empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service pre-populated with records. Records without an id get one.
    pub fn with_records(records: impl IntoIterator<Item = ShapeRecord>) -> Self {
        let service = Self::new();
        if let Ok(mut stored) = service.records.write() {
            for mut record in records {
                if record.id.is_none() {
                    record.id = Some(service.allocate_id());
                }
                stored.push(record);
            }
        }
        service
    }

    /// Toggle simulated availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<ShapeRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn allocate_id(&self) -> String {
        format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check_available(&self) -> ServiceResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServiceError::Unavailable("service offline".to_string()))
        }
    }
}

impl ShapeService for MemoryShapeService {
    fn list(&self) -> ServiceResult<Vec<ShapeRecord>> {
        self.check_available()?;
        let records = self
            .records
            .read()
            .map_err(|e| ServiceError::Unavailable(format!("Lock error: {}", e)))?;
        Ok(records.clone())
    }

    fn create(&self, record: &ShapeRecord) -> ServiceResult<ShapeRecord> {
        self.check_available()?;
        let mut records = self
            .records
            .write()
            .map_err(|e| ServiceError::Unavailable(format!("Lock error: {}", e)))?;
        let mut created = record.without_id();
        created.id = Some(self.allocate_id());
        records.push(created.clone());
        Ok(created)
    }

    fn delete(&self, id: &str) -> ServiceResult<()> {
        self.check_available()?;
        let mut records = self
            .records
            .write()
            .map_err(|e| ServiceError::Unavailable(format!("Lock error: {}", e)))?;
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
