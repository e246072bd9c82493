use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ExamCategory {
    #[default]
    General,
    Technical,
}

impl FromStr for ExamCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "General" => Ok(ExamCategory::General),
            "Technical" => Ok(ExamCategory::Technical),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    #[default]
    Normal,
    Resume,
    Reexam,
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ExamType::Normal),
            "resume" => Ok(ExamType::Resume),
            "reexam" => Ok(ExamType::Reexam),
            other => Err(format!("unknown exam type '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Code,
    Short,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub opts: Vec<String>,
    /// Zero-based index into `opts`, mcq only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<i32>,
}

impl Question {
    pub fn mcq(text: &str, opts: Vec<String>, answer: i32) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            question_type: QuestionType::Mcq,
            q: Some(text.to_string()),
            prompt: None,
            opts,
            answer: Some(answer),
        }
    }

    pub fn free_text(question_type: QuestionType, prompt: &str) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            question_type,
            q: None,
            prompt: Some(prompt.to_string()),
            opts: Vec::new(),
            answer: None,
        }
    }

    pub fn is_objective(&self) -> bool {
        self.question_type == QuestionType::Mcq
    }
}

/// Login and resume code generated as a distinct pair for a new exam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodePair {
    pub login: String,
    pub resume: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub title: String,
    pub category: ExamCategory,
    pub duration_min: i32,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default = "default_randomized")]
    pub randomized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Legacy single code, mirrors `login_code`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_code: Option<String>,
    #[serde(default)]
    pub exam_type: ExamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_randomized() -> bool {
    true
}

impl Exam {
    pub fn new(title: &str, category: ExamCategory, duration_min: i32, created_by: &str) -> Self {
        let now = Utc::now();
        Exam {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            category,
            duration_min,
            questions: Vec::new(),
            randomized: true,
            created_by: Some(created_by.to_string()),
            code: None,
            login_code: None,
            resume_code: None,
            exam_type: ExamType::Normal,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn assign_codes(&mut self, pair: CodePair) {
        self.code = Some(pair.login.clone());
        self.login_code = Some(pair.login);
        self.resume_code = Some(pair.resume);
    }

    /// Every non-empty code slot, legacy slot included.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        [&self.code, &self.login_code, &self.resume_code]
            .into_iter()
            .filter_map(|slot| slot.as_deref())
            .filter(|code| !code.is_empty())
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.codes().any(|c| c == code)
    }

    /// Whether the exam admits the re-exam/resume login path.
    pub fn accepts_reentry(&self) -> bool {
        matches!(self.exam_type, ExamType::Resume | ExamType::Reexam)
    }

    pub fn objective_question_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_objective()).count()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by.as_deref() == Some(user_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
