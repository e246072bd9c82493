use crate::models::domain::{Exam, ExamCategory, Question, User, UserRole};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A student with a registration number and no password
    pub fn test_student(reg_no: &str) -> User {
        User::student(reg_no, Some("Test Student"))
    }

    /// A two-question mcq exam with both codes assigned
    pub fn test_exam(code: &str, resume_code: &str) -> Exam {
        let mut exam = Exam::new("Sample", ExamCategory::General, 30, "faculty-1");
        exam.code = Some(code.to_string());
        exam.resume_code = Some(resume_code.to_string());
        exam.questions = vec![
            Question::mcq("2 + 2", vec!["3".into(), "4".into()], 1),
            Question::mcq("Capital of France", vec!["Paris".into(), "Rome".into()], 0),
        ];
        exam
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use super::*;
    use crate::{
        app_state::AppState,
        config::Config,
        repositories::{MockExamRepository, MockSubmissionRepository, MockUserRepository},
    };

    /// Wires an `AppState` over mocks; submissions get an empty mock.
    pub fn state_with(users: MockUserRepository, exams: MockExamRepository) -> AppState {
        state_with_all(users, exams, MockSubmissionRepository::new())
    }

    pub fn state_with_all(
        users: MockUserRepository,
        exams: MockExamRepository,
        submissions: MockSubmissionRepository,
    ) -> AppState {
        AppState::from_repositories(
            Config::test_config(),
            Arc::new(users),
            Arc::new(exams),
            Arc::new(submissions),
        )
    }

    /// A ready-to-send `Authorization` header value.
    pub fn bearer(state: &AppState, subject: &str, role: UserRole) -> String {
        let token = state
            .jwt_service
            .issue(subject, subject, role)
            .expect("token should be issued");
        format!("Bearer {}", token)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_fixtures_test_student() {
        let student = test_student("21CS001");
        student.assert_fields("Test Student", UserRole::Student, Some("21CS001"));
        assert!(!student.has_password());
    }

    #[test]
    fn test_fixtures_test_exam() {
        let exam = test_exam("100000001", "100000002");
        assert!(exam.matches_code("100000002"));
        assert_eq!(exam.objective_question_count(), 2);
    }
}
