use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{Database, EXAMS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Exam,
};

/// Filter matching any exam holding `code` in one of its three code slots.
pub fn code_namespace_filter(code: &str) -> Document {
    doc! {
        "$or": [
            { "code": code },
            { "loginCode": code },
            { "resumeCode": code },
        ]
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamRepository: Send + Sync {
    async fn create(&self, exam: Exam) -> AppResult<Exam>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Exam>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Exam>>;
    async fn find_by_title(&self, title: &str) -> AppResult<Option<Exam>>;
    async fn code_in_use(&self, code: &str) -> AppResult<bool>;
    async fn list_all(&self) -> AppResult<Vec<Exam>>;
    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Exam>>;
    async fn update(&self, exam: Exam) -> AppResult<Exam>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoExamRepository {
    collection: Collection<Exam>,
}

impl MongoExamRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(EXAMS_COLLECTION);
        Self { collection }
    }

    fn unique_sparse(field: &str, name: &str) -> IndexModel {
        let mut keys = Document::new();
        keys.insert(field, 1);

        IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .sparse(true)
                    .name(name.to_string())
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl ExamRepository for MongoExamRepository {
    async fn create(&self, exam: Exam) -> AppResult<Exam> {
        self.collection.insert_one(&exam).await?;
        Ok(exam)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Exam>> {
        let exam = self.collection.find_one(doc! { "id": id }).await?;
        Ok(exam)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Exam>> {
        let exam = self.collection.find_one(code_namespace_filter(code)).await?;
        Ok(exam)
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<Exam>> {
        let exam = self.collection.find_one(doc! { "title": title }).await?;
        Ok(exam)
    }

    async fn code_in_use(&self, code: &str) -> AppResult<bool> {
        let count = self
            .collection
            .count_documents(code_namespace_filter(code))
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    async fn list_all(&self) -> AppResult<Vec<Exam>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;
        let exams: Vec<Exam> = cursor.try_collect().await?;
        Ok(exams)
    }

    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Exam>> {
        let cursor = self
            .collection
            .find(doc! { "createdBy": user_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        let exams: Vec<Exam> = cursor.try_collect().await?;
        Ok(exams)
    }

    async fn update(&self, exam: Exam) -> AppResult<Exam> {
        let result = self
            .collection
            .replace_one(doc! { "id": &exam.id }, &exam)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Exam with id '{}' not found",
                exam.id
            )));
        }

        Ok(exam)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exams collection");

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                )
                .build(),
            Self::unique_sparse("code", "code_unique"),
            Self::unique_sparse("loginCode", "login_code_unique"),
            Self::unique_sparse("resumeCode", "resume_code_unique"),
            IndexModel::builder()
                .keys(doc! { "examType": 1 })
                .options(IndexOptions::builder().name("exam_type".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "createdBy": 1, "createdAt": -1 })
                .options(IndexOptions::builder().name("creator_recent".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;

        log::info!("Successfully created indexes for exams collection");
        Ok(())
    }
}
