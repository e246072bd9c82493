pub mod auth_service;
pub mod code_allocator;
pub mod exam_service;
pub mod grading;
pub mod proctor;
pub mod question_randomizer;
pub mod retry;
pub mod staff_service;
pub mod student_service;
pub mod submission_service;
pub mod txt_parser;

pub use auth_service::AuthService;
pub use code_allocator::CodeAllocator;
pub use exam_service::ExamService;
pub use proctor::ProctorBroadcaster;
pub use staff_service::StaffService;
pub use student_service::StudentService;
pub use submission_service::SubmissionService;
