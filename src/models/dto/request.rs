use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::errors::{AppError, AppResult};
use crate::models::domain::{Answer, ExamCategory, ExamType, Question, QuestionType};
use crate::services::code_allocator::is_valid_exam_code;

fn validate_exam_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_exam_code(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("exam_code");
        err.message = Some("Exam code must be exactly 9 digits".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    #[validate(length(min = 1, max = 64, message = "regNo required"))]
    pub reg_no: String,

    #[validate(custom(function = "validate_exam_code"))]
    pub exam_code: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 100, message = "username required"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "password required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FacultyCredentialsRequest {
    #[validate(length(min = 1, max = 100, message = "username required"))]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "password required"))]
    pub password: String,

    #[validate(length(min = 4, max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    #[validate(length(min = 1, max = 64, message = "regNo required"))]
    pub reg_no: String,

    #[validate(length(max = 100))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 4, max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub department: Option<String>,

    #[validate(length(max = 20))]
    pub year: Option<String>,

    #[validate(length(max = 20))]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionInput {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub q: Option<String>,
    pub prompt: Option<String>,
    #[serde(default)]
    pub opts: Vec<String>,
    pub answer: Option<i32>,
}

impl TryFrom<QuestionInput> for Question {
    type Error = AppError;

    fn try_from(input: QuestionInput) -> AppResult<Self> {
        if input.question_type == QuestionType::Mcq {
            let text = input
                .q
                .as_deref()
                .or(input.prompt.as_deref())
                .map(str::trim)
                .unwrap_or_default();
            if text.is_empty() {
                return Err(AppError::ValidationError(
                    "mcq question text required".to_string(),
                ));
            }
            if input.opts.len() < 2 {
                return Err(AppError::ValidationError(
                    "mcq question needs at least two options".to_string(),
                ));
            }
            let answer = input.answer.ok_or_else(|| {
                AppError::ValidationError("mcq question needs a correct option index".to_string())
            })?;
            if answer < 0 || answer as usize >= input.opts.len() {
                return Err(AppError::ValidationError(format!(
                    "mcq answer index {} out of range for {} options",
                    answer,
                    input.opts.len()
                )));
            }
            return Ok(Question::mcq(text, input.opts, answer));
        }

        let prompt = input
            .prompt
            .as_deref()
            .or(input.q.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        if prompt.is_empty() {
            return Err(AppError::ValidationError("question prompt required".to_string()));
        }
        Ok(Question::free_text(input.question_type, prompt))
    }
}

pub fn questions_from_inputs(inputs: Vec<QuestionInput>) -> AppResult<Vec<Question>> {
    inputs.into_iter().map(Question::try_from).collect()
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub category: Option<ExamCategory>,

    #[validate(range(min = 1, max = 1440))]
    pub duration_min: Option<i32>,

    #[serde(default)]
    pub questions: Vec<QuestionInput>,

    pub randomized: Option<bool>,

    pub exam_type: Option<ExamType>,

    /// Append to an existing exam with the same title instead of creating one.
    #[serde(default)]
    pub append: bool,
}

/// Query parameters accompanying a plain-text question upload. Unknown
/// categories and exam types fall back to defaults rather than failing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadTxtParams {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub category: Option<String>,
    pub duration_min: Option<i32>,
    pub randomized: Option<bool>,
    pub exam_type: Option<String>,
    #[serde(default)]
    pub append: bool,
}

impl UploadTxtParams {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Uploaded Exam")
    }

    pub fn category(&self) -> Option<ExamCategory> {
        self.category.as_deref().and_then(|c| c.parse().ok())
    }

    pub fn duration_min(&self) -> Option<i32> {
        self.duration_min.filter(|d| *d > 0)
    }

    pub fn exam_type(&self) -> ExamType {
        self.exam_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub category: Option<ExamCategory>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_min: Option<i32>,
    pub randomized: Option<bool>,
    pub exam_type: Option<ExamType>,
    pub questions: Option<Vec<QuestionInput>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerInput {
    pub qid: String,
    #[serde(default)]
    pub value: Value,
}

impl From<AnswerInput> for Answer {
    fn from(input: AnswerInput) -> Self {
        Answer {
            qid: input.qid,
            value: input.value,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: Vec<AnswerInput>,

    #[validate(range(min = 0))]
    pub tab_switches: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewInput {
    pub qid: Option<String>,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default)]
    pub reviews: Vec<ReviewInput>,
    pub score_manual: Option<f64>,
}

/// Arbitrary proctoring payload, forwarded as-is.
pub type TabEventRequest = Map<String, Value>;
