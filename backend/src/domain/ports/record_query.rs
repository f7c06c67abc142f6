//! Driving port for record reads.

use async_trait::async_trait;

use crate::domain::{Error, Record, RecordId};

/// Port for reading records of one kind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordQuery: Send + Sync {
    /// Fails with [`crate::domain::ErrorCode::NotFound`] for unknown ids.
    async fn find_by_id(&self, id: RecordId) -> Result<Record, Error>;

    /// Records matching any of `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: Vec<RecordId>) -> Result<Vec<Record>, Error>;

    async fn list_all(&self) -> Result<Vec<Record>, Error>;
}
