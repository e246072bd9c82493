use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
    Evaluated,
    /// Accepted on read for stored data; no grading transition produces it.
    Pending,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Answer {
    pub qid: String,
    /// Option index for mcq, free-form for code and short answers.
    #[serde(default)]
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Review {
    pub qid: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub exam: String,
    pub user: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// Always `score_auto + score_manual`.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub score_auto: i32,
    #[serde(default)]
    pub score_manual: f64,
    /// Number of objective questions in the exam at submission time.
    #[serde(default)]
    pub total: i32,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub tab_switches: i32,
    /// Bumped on every write, used for compare-and-set updates.
    #[serde(default)]
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn new(exam_id: &str, user_id: &str, answers: Vec<Answer>, tab_switches: i32) -> Self {
        let now = Utc::now();
        Submission {
            id: Uuid::new_v4().to_string(),
            exam: exam_id.to_string(),
            user: user_id.to_string(),
            answers,
            score: 0.0,
            score_auto: 0,
            score_manual: 0.0,
            total: 0,
            status: SubmissionStatus::Submitted,
            reviews: Vec::new(),
            tab_switches,
            version: 0,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn recompute_score(&mut self) {
        self.score = f64::from(self.score_auto) + self.score_manual;
    }

    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Some(Utc::now());
    }
}
