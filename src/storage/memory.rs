use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::models::{NewSubmission, SubmissionRecord};

use super::{StorageError, SubmissionStore};

/// Process-local store for ephemeral deployments and tests. Contents are
/// lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn append(
        &self,
        submission: &NewSubmission,
        submitted_at: &str,
    ) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.push(SubmissionRecord {
            unit_number: submission.unit_number,
            name: submission.name.clone(),
            submitted_at: submitted_at.to_string(),
        });
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.clone())
    }
}
