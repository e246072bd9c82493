pub mod exam_repository;
pub mod submission_repository;
pub mod user_repository;

pub use exam_repository::{ExamRepository, MongoExamRepository};
pub use submission_repository::{MongoSubmissionRepository, SubmissionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use exam_repository::MockExamRepository;
#[cfg(test)]
pub use submission_repository::MockSubmissionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
