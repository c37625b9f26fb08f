//! Append-only persistence for submission records.
//!
//! The orchestrator depends only on the [`SubmissionStore`] trait; which
//! backend gets wired in is a construction-time decision made in `main`
//! from the `[storage]` config section.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSubmission, SubmissionRecord};

mod database;
mod file;
mod memory;

pub use database::DatabaseStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Backend unavailable or a write/read failed. Recovered locally by the
/// orchestrator (downgraded to a warning); logged for operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored submissions are not readable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("database failure: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Append one validated submission with its server-generated timestamp.
    async fn append(
        &self,
        submission: &NewSubmission,
        submitted_at: &str,
    ) -> Result<(), StorageError>;

    /// All persisted records in insertion order, oldest first. An empty or
    /// never-written store reads as an empty list; genuine read failures
    /// propagate and surface as HTTP 500 from the viewer endpoints.
    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError>;
}
