use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::models::{NewSubmission, SubmissionRecord};

use super::{StorageError, SubmissionStore};

const DATA_FILE_NAME: &str = "submissions.json";

/// JSON-file backend: the full record list lives in one file under the data
/// directory and every append rewrites it. Suitable for single-instance
/// deployments; concurrent writers can lose updates, which is an accepted
/// limitation of this backend.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(DATA_FILE_NAME),
        }
    }

    /// A missing file reads as an empty store; any other I/O or decode
    /// failure propagates.
    async fn read_records(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_records(&self, records: &[SubmissionRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let encoded = serde_json::to_vec_pretty(records)?;
        fs::write(&self.path, encoded).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for FileStore {
    async fn append(
        &self,
        submission: &NewSubmission,
        submitted_at: &str,
    ) -> Result<(), StorageError> {
        let mut records = self.read_records().await?;
        records.push(SubmissionRecord {
            unit_number: submission.unit_number,
            name: submission.name.clone(),
            submitted_at: submitted_at.to_string(),
        });
        self.write_records(&records).await
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
        self.read_records().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(unit: u16, name: &str) -> NewSubmission {
        NewSubmission {
            unit_number: unit,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appends_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = FileStore::new(dir.path());
            store
                .append(&submission(101, "Alice"), "2026-03-02 08:30:05")
                .await
                .unwrap();
            store
                .append(&submission(202, "Bob"), "2026-03-02 08:31:00")
                .await
                .unwrap();
        }

        let reopened = FileStore::new(dir.path());
        let records = reopened.list_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[1].name, "Bob");
    }

    #[tokio::test]
    async fn corrupt_file_propagates_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(DATA_FILE_NAME), b"not json")
            .await
            .unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.list_all().await,
            Err(StorageError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn creates_data_dir_on_first_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("data");
        let store = FileStore::new(&nested);
        store
            .append(&submission(303, "Cara"), "2026-03-02 08:32:00")
            .await
            .unwrap();
        assert!(nested.join(DATA_FILE_NAME).exists());
    }
}
