use std::collections::HashMap;

use serde_json::Value;

use crate::models::{
    domain::{Answer, Exam, Review, Submission, SubmissionStatus},
    dto::request::ReviewRequest,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoGrade {
    pub score_auto: i32,
    pub total: i32,
}

/// Scores the mcq questions of `exam` against `answers`. Only a numeric
/// answer equal to the correct option index counts; a string such as `"1"`
/// does not. Other question types are left for manual review and do not
/// count towards `total`.
pub fn auto_grade(exam: &Exam, answers: &[Answer]) -> AutoGrade {
    let by_qid: HashMap<&str, &Value> = answers
        .iter()
        .map(|answer| (answer.qid.as_str(), &answer.value))
        .collect();

    let mut grade = AutoGrade {
        score_auto: 0,
        total: 0,
    };

    for question in exam.questions.iter().filter(|q| q.is_objective()) {
        grade.total += 1;

        let chosen = by_qid.get(question.id.as_str()).and_then(|v| v.as_f64());
        let correct = question.answer.map(f64::from);
        if chosen.is_some() && chosen == correct {
            grade.score_auto += 1;
        }
    }

    grade
}

/// Builds the initial record for a fresh attempt: auto score in place, no
/// manual score, status `submitted`.
pub fn grade_submission(
    exam: &Exam,
    user_id: &str,
    answers: Vec<Answer>,
    tab_switches: i32,
) -> Submission {
    let grade = auto_grade(exam, &answers);

    let mut submission = Submission::new(&exam.id, user_id, answers, tab_switches);
    submission.score_auto = grade.score_auto;
    submission.total = grade.total;
    submission.score_manual = 0.0;
    submission.status = SubmissionStatus::Submitted;
    submission.recompute_score();
    submission
}

/// Applies a review to `submission`.
///
/// Entries are matched to existing reviews by `qid` and only the fields they
/// carry are overwritten. Unknown qids are appended with a zero score and an
/// empty comment as defaults. Entries without a qid are ignored. The manual
/// score is the override when given, otherwise the sum over every stored
/// review. The status always ends up `evaluated`, even for an empty review.
pub fn merge_reviews(submission: &mut Submission, request: &ReviewRequest) {
    for entry in &request.reviews {
        let Some(qid) = entry.qid.as_deref().filter(|q| !q.is_empty()) else {
            continue;
        };

        match submission.reviews.iter_mut().find(|r| r.qid == qid) {
            Some(existing) => {
                if let Some(score) = entry.score {
                    existing.score = score;
                }
                if let Some(comment) = &entry.comment {
                    existing.comment = comment.clone();
                }
            }
            None => submission.reviews.push(Review {
                qid: qid.to_string(),
                score: entry.score.unwrap_or(0.0),
                comment: entry.comment.clone().unwrap_or_default(),
            }),
        }
    }

    submission.score_manual = request
        .score_manual
        .unwrap_or_else(|| submission.reviews.iter().map(|r| r.score).sum());
    submission.recompute_score();
    submission.status = SubmissionStatus::Evaluated;
}
