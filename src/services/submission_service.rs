use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    auth::{require_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, Submission, User, UserRole},
        dto::{
            request::{ReviewRequest, SubmitAnswersRequest},
            response::{SubmissionDetail, SubmitterDto},
        },
    },
    repositories::{ExamRepository, SubmissionRepository, UserRepository},
    services::{
        grading::{grade_submission, merge_reviews},
        retry::{retry_when, RetryPolicy},
    },
};

fn is_version_conflict(err: &AppError) -> bool {
    matches!(err, AppError::Conflict(_))
}

pub struct SubmissionService {
    submissions: Arc<dyn SubmissionRepository>,
    exams: Arc<dyn ExamRepository>,
    users: Arc<dyn UserRepository>,
    retry: RetryPolicy,
}

impl SubmissionService {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        exams: Arc<dyn ExamRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self::with_retry_policy(submissions, exams, users, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        submissions: Arc<dyn SubmissionRepository>,
        exams: Arc<dyn ExamRepository>,
        users: Arc<dyn UserRepository>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            submissions,
            exams,
            users,
            retry,
        }
    }

    /// Records an attempt with its mcq answers already scored.
    pub async fn submit(
        &self,
        user_id: &str,
        exam_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<Submission> {
        request.validate()?;

        let exam = self
            .exams
            .find_by_id(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;

        let answers: Vec<Answer> = request.answers.into_iter().map(Answer::from).collect();
        let submission = grade_submission(
            &exam,
            user_id,
            answers,
            request.tab_switches.unwrap_or(0),
        );

        let submission = self.submissions.create(submission).await?;
        log::info!(
            "Submission {} for exam {}: {}/{} auto",
            submission.id,
            exam.id,
            submission.score_auto,
            submission.total
        );
        Ok(submission)
    }

    pub async fn get(&self, id: &str) -> AppResult<SubmissionDetail> {
        let submission = self.find(id).await?;
        let submitter = self
            .users
            .find_by_id(&submission.user)
            .await?
            .as_ref()
            .map(SubmitterDto::from);

        Ok(SubmissionDetail {
            submission,
            submitter,
        })
    }

    pub async fn get_mine(&self, user_id: &str, exam_id: &str) -> AppResult<Submission> {
        self.submissions
            .find_by_exam_and_user(exam_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    /// Every attempt on `exam_id`. Faculty may only list exams they own.
    pub async fn list_for_exam(
        &self,
        claims: &Claims,
        exam_id: &str,
    ) -> AppResult<Vec<SubmissionDetail>> {
        if claims.role != UserRole::Admin {
            let exam = self
                .exams
                .find_by_id(exam_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;
            require_owner_or_admin(claims, exam.created_by.as_deref())?;
        }

        let submissions = self.submissions.list_by_exam(exam_id).await?;

        let mut user_ids: Vec<String> = submissions.iter().map(|s| s.user.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let submitters: HashMap<String, User> = self
            .users
            .find_by_ids(user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Ok(submissions
            .into_iter()
            .map(|submission| {
                let submitter = submitters.get(&submission.user).map(SubmitterDto::from);
                SubmissionDetail {
                    submission,
                    submitter,
                }
            })
            .collect())
    }

    /// Merges a manual review. The write is conditional on the version read,
    /// so a concurrent review makes this attempt re-read and merge again.
    pub async fn review(&self, id: &str, request: &ReviewRequest) -> AppResult<Submission> {
        let submission = retry_when(&self.retry, is_version_conflict, move || {
            self.review_once(id, request)
        })
        .await?;

        log::info!(
            "Reviewed submission {}: score {} ({} manual)",
            submission.id,
            submission.score,
            submission.score_manual
        );
        Ok(submission)
    }

    async fn review_once(&self, id: &str, request: &ReviewRequest) -> AppResult<Submission> {
        let mut submission = self.find(id).await?;
        let expected_version = submission.version;

        merge_reviews(&mut submission, request);
        submission.touch();

        self.submissions
            .update_versioned(submission, expected_version)
            .await
            .inspect_err(|e| {
                if is_version_conflict(e) {
                    log::warn!("Submission {} changed during review, merging again", id);
                }
            })
    }

    async fn find(&self, id: &str) -> AppResult<Submission> {
        self.submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission with id '{}' not found", id)))
    }
}
