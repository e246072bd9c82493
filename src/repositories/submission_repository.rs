use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, SUBMISSIONS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Submission,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: Submission) -> AppResult<Submission>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Submission>>;
    /// Most recent attempt of `user_id` on `exam_id`.
    async fn find_by_exam_and_user(
        &self,
        exam_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Submission>>;
    async fn list_by_exam(&self, exam_id: &str) -> AppResult<Vec<Submission>>;
    /// Replace the stored submission only if it is still at `expected_version`.
    /// A concurrent writer that got there first yields `AppError::Conflict`.
    async fn update_versioned(
        &self,
        submission: Submission,
        expected_version: i64,
    ) -> AppResult<Submission>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSubmissionRepository {
    collection: Collection<Submission>,
}

impl MongoSubmissionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(SUBMISSIONS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl SubmissionRepository for MongoSubmissionRepository {
    async fn create(&self, submission: Submission) -> AppResult<Submission> {
        self.collection.insert_one(&submission).await?;
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Submission>> {
        let submission = self.collection.find_one(doc! { "id": id }).await?;
        Ok(submission)
    }

    async fn find_by_exam_and_user(
        &self,
        exam_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Submission>> {
        let submission = self
            .collection
            .find_one(doc! { "exam": exam_id, "user": user_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(submission)
    }

    async fn list_by_exam(&self, exam_id: &str) -> AppResult<Vec<Submission>> {
        let cursor = self
            .collection
            .find(doc! { "exam": exam_id })
            .sort(doc! { "createdAt": 1 })
            .await?;
        let submissions: Vec<Submission> = cursor.try_collect().await?;
        Ok(submissions)
    }

    async fn update_versioned(
        &self,
        submission: Submission,
        expected_version: i64,
    ) -> AppResult<Submission> {
        let result = self
            .collection
            .replace_one(
                doc! { "id": &submission.id, "version": expected_version },
                &submission,
            )
            .await?;

        if result.matched_count == 0 {
            let exists = self
                .collection
                .count_documents(doc! { "id": &submission.id })
                .await?
                > 0;
            return Err(if exists {
                AppError::Conflict(format!(
                    "Submission '{}' was modified concurrently",
                    submission.id
                ))
            } else {
                AppError::NotFound(format!("Submission with id '{}' not found", submission.id))
            });
        }

        Ok(submission)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for submissions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let exam_user_index = IndexModel::builder()
            .keys(doc! { "exam": 1, "user": 1 })
            .options(
                IndexOptions::builder()
                    .name("exam_user".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(exam_user_index).await?;

        log::info!("Successfully created indexes for submissions collection");
        Ok(())
    }
}
