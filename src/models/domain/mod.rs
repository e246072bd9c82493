pub mod exam;
pub mod submission;
pub mod user;
pub use exam::{CodePair, Exam, ExamCategory, ExamType, Question, QuestionType};
pub use submission::{Answer, Review, Submission, SubmissionStatus};
pub use user::{User, UserRole};
