use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{Exam, ExamCategory, Question, UserRole},
        dto::request::{questions_from_inputs, CreateExamRequest, UpdateExamRequest, UploadTxtParams},
    },
    repositories::ExamRepository,
    services::{
        code_allocator::{is_valid_exam_code, CodeAllocator},
        question_randomizer,
        retry::{retry_when, RetryPolicy},
        txt_parser::parse_mcq_txt,
    },
};

const DEFAULT_DURATION_MIN: i32 = 60;

/// A unique index on a code slot rejected the write: another allocator
/// claimed the same code between our check and our insert.
fn is_code_collision(err: &AppError) -> bool {
    matches!(err, AppError::AlreadyExists(_))
}

/// Changes applied when new questions land on an exam that already exists.
struct Append {
    questions: Vec<Question>,
    duration_min: Option<i32>,
    category: Option<ExamCategory>,
}

pub struct ExamService {
    exams: Arc<dyn ExamRepository>,
    allocator: Arc<CodeAllocator>,
    retry: RetryPolicy,
}

impl ExamService {
    pub fn new(exams: Arc<dyn ExamRepository>, allocator: Arc<CodeAllocator>) -> Self {
        Self::with_retry_policy(exams, allocator, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        exams: Arc<dyn ExamRepository>,
        allocator: Arc<CodeAllocator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            exams,
            allocator,
            retry,
        }
    }

    /// Creates an exam with a fresh login/resume code pair, or, with
    /// `append` set and an exam of the same title on file, adds the
    /// questions to that exam instead.
    pub async fn create(&self, creator_id: &str, request: CreateExamRequest) -> AppResult<Exam> {
        request.validate()?;
        let questions = questions_from_inputs(request.questions)?;

        if request.append {
            if let Some(existing) = self.exams.find_by_title(&request.title).await? {
                let append = Append {
                    questions,
                    duration_min: request.duration_min,
                    category: request.category,
                };
                return self.append_to(existing, append).await;
            }
        }

        let mut exam = Exam::new(
            &request.title,
            request.category.unwrap_or_default(),
            request.duration_min.unwrap_or(DEFAULT_DURATION_MIN),
            creator_id,
        );
        exam.questions = questions;
        exam.randomized = request.randomized.unwrap_or(true);
        exam.exam_type = request.exam_type.unwrap_or_default();

        self.insert_with_codes(&exam).await
    }

    /// Same as `create` but the questions come from a plain-text mcq file.
    pub async fn upload_txt(
        &self,
        creator_id: &str,
        params: &UploadTxtParams,
        content: &str,
    ) -> AppResult<Exam> {
        params.validate()?;

        let questions = parse_mcq_txt(content);
        if questions.is_empty() {
            return Err(AppError::ValidationError("No questions parsed".to_string()));
        }

        if params.append {
            if let Some(existing) = self.exams.find_by_title(params.title()).await? {
                let append = Append {
                    questions,
                    duration_min: params.duration_min(),
                    category: params.category(),
                };
                return self.append_to(existing, append).await;
            }
        }

        let mut exam = Exam::new(
            params.title(),
            params.category().unwrap_or_default(),
            params.duration_min().unwrap_or(DEFAULT_DURATION_MIN),
            creator_id,
        );
        exam.questions = questions;
        exam.randomized = params.randomized.unwrap_or(true);
        exam.exam_type = params.exam_type();

        self.insert_with_codes(&exam).await
    }

    async fn insert_with_codes(&self, template: &Exam) -> AppResult<Exam> {
        let allocator = &self.allocator;
        let exams = &self.exams;

        let exam = retry_when(&self.retry, is_code_collision, move || async move {
            let mut exam = template.clone();
            exam.assign_codes(allocator.allocate_pair().await?);
            exams.create(exam).await.inspect_err(|e| {
                if is_code_collision(e) {
                    log::warn!("Exam code taken at insert time, allocating again");
                }
            })
        })
        .await?;

        log::info!("Created exam {} ({} questions)", exam.id, exam.questions.len());
        Ok(exam)
    }

    async fn append_to(&self, existing: Exam, append: Append) -> AppResult<Exam> {
        let allocator = &self.allocator;
        let exams = &self.exams;
        let existing = &existing;
        let append = &append;

        let exam = retry_when(&self.retry, is_code_collision, move || async move {
            let mut exam = existing.clone();
            exam.questions.extend(append.questions.iter().cloned());
            if let Some(duration_min) = append.duration_min {
                exam.duration_min = duration_min;
            }
            if let Some(category) = append.category {
                exam.category = category;
            }
            allocator.backfill(&mut exam).await?;
            exam.touch();
            exams.update(exam).await
        })
        .await?;

        log::info!(
            "Appended {} questions to exam {}",
            append.questions.len(),
            exam.id
        );
        Ok(exam)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Exam>> {
        self.exams.list_all().await
    }

    /// Faculty see the exams they created; admins see everything.
    pub async fn list_mine(&self, claims: &Claims) -> AppResult<Vec<Exam>> {
        match claims.role {
            UserRole::Admin => self.exams.list_all().await,
            _ => self.exams.list_by_creator(&claims.sub).await,
        }
    }

    pub async fn get_view(&self, id: &str) -> AppResult<Exam> {
        let exam = self.get(id).await?;
        Ok(question_randomizer::present(&exam))
    }

    /// Resolves any of the three code slots.
    pub async fn get_view_by_code(&self, code: &str) -> AppResult<Exam> {
        if !is_valid_exam_code(code) {
            return Err(AppError::ValidationError(
                "Exam code must be exactly 9 digits".to_string(),
            ));
        }
        let exam = self
            .exams
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;
        Ok(question_randomizer::present(&exam))
    }

    async fn get(&self, id: &str) -> AppResult<Exam> {
        self.exams
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exam with id '{}' not found", id)))
    }

    /// Metadata and question edits. Code slots are owned by the allocator and
    /// cannot be set here.
    pub async fn update(&self, id: &str, request: UpdateExamRequest) -> AppResult<Exam> {
        request.validate()?;

        let mut exam = self.get(id).await?;
        let UpdateExamRequest {
            title,
            category,
            duration_min,
            randomized,
            exam_type,
            questions,
        } = request;

        if let Some(title) = title {
            exam.title = title;
        }
        if let Some(category) = category {
            exam.category = category;
        }
        if let Some(duration_min) = duration_min {
            exam.duration_min = duration_min;
        }
        if let Some(randomized) = randomized {
            exam.randomized = randomized;
        }
        if let Some(exam_type) = exam_type {
            exam.exam_type = exam_type;
        }
        if let Some(questions) = questions {
            exam.questions = questions_from_inputs(questions)?;
        }
        exam.touch();

        let exam = self.exams.update(exam).await?;
        log::info!("Updated exam {}", exam.id);
        Ok(exam)
    }

    /// Admins may delete any exam, faculty only their own.
    pub async fn delete(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let exam = self.get(id).await?;
        require_owner_or_admin(claims, exam.created_by.as_deref())?;

        if !self.exams.delete(&exam.id).await? {
            return Err(AppError::NotFound(format!("Exam with id '{}' not found", id)));
        }
        log::info!("Deleted exam {} on behalf of {}", exam.id, claims.sub);
        Ok(())
    }
}
