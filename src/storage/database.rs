use async_trait::async_trait;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};

use crate::entities::submission;
use crate::models::{NewSubmission, SubmissionRecord};

use super::{StorageError, SubmissionStore};

/// Postgres backend for deployments with a durable external store. The
/// `migration` crate owns the schema; `main` runs migrations before wiring
/// this backend in.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    database: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl SubmissionStore for DatabaseStore {
    async fn append(
        &self,
        submission: &NewSubmission,
        submitted_at: &str,
    ) -> Result<(), StorageError> {
        let record = submission::ActiveModel {
            id: ActiveValue::NotSet,
            unit_number: ActiveValue::Set(i32::from(submission.unit_number)),
            name: ActiveValue::Set(submission.name.clone()),
            submitted_at: ActiveValue::Set(submitted_at.to_string()),
        };
        submission::Entity::insert(record)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
        let models = submission::Entity::find()
            .order_by_asc(submission::Column::Id)
            .all(&self.database)
            .await?;

        let mut records = Vec::with_capacity(models.len());
        for model in models {
            assert!(
                model.unit_number >= 1 && model.unit_number <= 9_999,
                "Persisted unit number out of range"
            );
            records.push(SubmissionRecord {
                unit_number: model.unit_number as u16,
                name: model.name,
                submitted_at: model.submitted_at,
            });
        }
        Ok(records)
    }
}
