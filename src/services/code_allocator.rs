use std::sync::Arc;

use rand::Rng;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{CodePair, Exam},
    repositories::ExamRepository,
};

pub const CODE_LEN: usize = 9;
pub const CODE_MIN: u32 = 100_000_000;
pub const CODE_MAX: u32 = 999_999_999;

/// Exactly nine ASCII digits. Leading zeros are accepted on input even
/// though the allocator never produces them.
pub fn is_valid_exam_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

fn random_code() -> String {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
}

type CodeSource = Box<dyn Fn() -> String + Send + Sync>;

/// Issues exam codes that are free across the `code`, `loginCode` and
/// `resumeCode` slots of every stored exam.
pub struct CodeAllocator {
    repository: Arc<dyn ExamRepository>,
    max_draws: usize,
    source: CodeSource,
}

impl CodeAllocator {
    pub fn new(repository: Arc<dyn ExamRepository>, max_draws: usize) -> Self {
        Self::with_source(repository, max_draws, random_code)
    }

    pub fn with_source<S>(repository: Arc<dyn ExamRepository>, max_draws: usize, source: S) -> Self
    where
        S: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            repository,
            max_draws: max_draws.max(1),
            source: Box::new(source),
        }
    }

    pub async fn allocate(&self) -> AppResult<String> {
        self.allocate_excluding(&[]).await
    }

    /// Draws until a code is found that is neither stored nor in `reserved`.
    /// The check is not atomic with the later insert; the unique indexes on
    /// the code slots catch a concurrent allocator that picked the same value.
    pub async fn allocate_excluding(&self, reserved: &[&str]) -> AppResult<String> {
        for draw in 1..=self.max_draws {
            let candidate = (self.source)();
            if reserved.contains(&candidate.as_str()) {
                log::debug!("Exam code draw {} repeated a reserved code", draw);
                continue;
            }
            if !self.repository.code_in_use(&candidate).await? {
                return Ok(candidate);
            }
            log::debug!("Exam code draw {} collided with a stored code", draw);
        }

        log::error!("No free exam code found after {} draws", self.max_draws);
        Err(AppError::CodeSpaceExhausted(format!(
            "no free exam code after {} draws",
            self.max_draws
        )))
    }

    pub async fn allocate_pair(&self) -> AppResult<CodePair> {
        let login = self.allocate().await?;
        let resume = self.allocate_excluding(&[login.as_str()]).await?;
        Ok(CodePair { login, resume })
    }

    /// Fills whichever of `loginCode`/`resumeCode` is missing and mirrors the
    /// login code into the legacy slot. A legacy `code` without a login code
    /// is adopted as the login code. Returns whether anything changed.
    pub async fn backfill(&self, exam: &mut Exam) -> AppResult<bool> {
        let mut changed = false;

        if exam.login_code.is_none() {
            let legacy = exam.code.clone().filter(|code| !code.is_empty());
            exam.login_code = match legacy {
                Some(code) => Some(code),
                None => {
                    let held: Vec<String> = exam.codes().map(str::to_string).collect();
                    let held: Vec<&str> = held.iter().map(String::as_str).collect();
                    Some(self.allocate_excluding(&held).await?)
                }
            };
            changed = true;
        }

        if exam.resume_code.is_none() {
            let held: Vec<String> = exam.codes().map(str::to_string).collect();
            let held: Vec<&str> = held.iter().map(String::as_str).collect();
            exam.resume_code = Some(self.allocate_excluding(&held).await?);
            changed = true;
        }

        if exam.code.as_deref().map_or(true, str::is_empty) {
            exam.code = exam.login_code.clone();
            changed = true;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::ExamCategory;
    use crate::repositories::MockExamRepository;
    use mockall::predicate::*;
    use std::sync::Mutex;

    fn scripted(codes: &[&str]) -> impl Fn() -> String + Send + Sync + 'static {
        let queue = Mutex::new(codes.iter().map(|c| c.to_string()).collect::<Vec<_>>());
        move || {
            let mut queue = queue.lock().unwrap();
            queue.remove(0)
        }
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_exam_code("123456789"));
        assert!(is_valid_exam_code("000000001"));
        assert!(!is_valid_exam_code("12345678"));
        assert!(!is_valid_exam_code("1234567890"));
        assert!(!is_valid_exam_code("12345678x"));
        assert!(!is_valid_exam_code(" 12345678"));
    }

    #[tokio::test]
    async fn test_random_codes_are_nine_digits() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use().returning(|_| Ok(false));
        let allocator = CodeAllocator::new(Arc::new(repo), 4);

        for _ in 0..50 {
            let code = allocator.allocate().await.unwrap();
            assert!(is_valid_exam_code(&code));
            assert!(!code.starts_with('0'));
        }
    }

    #[tokio::test]
    async fn test_redraws_on_collision() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use()
            .with(eq("111111111"))
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_code_in_use()
            .with(eq("222222222"))
            .times(1)
            .returning(|_| Ok(false));

        let allocator =
            CodeAllocator::with_source(Arc::new(repo), 8, scripted(&["111111111", "222222222"]));

        assert_eq!(allocator.allocate().await.unwrap(), "222222222");
    }

    #[tokio::test]
    async fn test_exhaustion_is_reported() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use().times(3).returning(|_| Ok(true));

        let allocator = CodeAllocator::with_source(Arc::new(repo), 3, || "123123123".to_string());

        let result = allocator.allocate().await;
        assert!(matches!(result, Err(AppError::CodeSpaceExhausted(_))));
    }

    #[tokio::test]
    async fn test_pair_members_are_distinct() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use().returning(|_| Ok(false));

        let allocator = CodeAllocator::with_source(
            Arc::new(repo),
            8,
            scripted(&["333333333", "333333333", "444444444"]),
        );

        let pair = allocator.allocate_pair().await.unwrap();
        assert_eq!(pair.login, "333333333");
        assert_eq!(pair.resume, "444444444");
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use()
            .returning(|_| Err(AppError::DatabaseError("down".to_string())));

        let allocator = CodeAllocator::new(Arc::new(repo), 8);
        assert!(matches!(
            allocator.allocate().await,
            Err(AppError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_backfill_fills_missing_slots_only() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use().returning(|_| Ok(false));

        let allocator = CodeAllocator::with_source(
            Arc::new(repo),
            8,
            scripted(&["555555555", "555555555", "666666666"]),
        );

        let mut exam = Exam::new("Legacy", ExamCategory::General, 30, "admin-1");
        exam.login_code = Some("555555555".to_string());

        assert!(allocator.backfill(&mut exam).await.unwrap());
        assert_eq!(exam.login_code.as_deref(), Some("555555555"));
        assert_eq!(exam.resume_code.as_deref(), Some("666666666"));
        assert_eq!(exam.code.as_deref(), Some("555555555"));

        assert!(!allocator.backfill(&mut exam).await.unwrap());
    }

    #[tokio::test]
    async fn test_backfill_adopts_legacy_code_as_login_code() {
        let mut repo = MockExamRepository::new();
        repo.expect_code_in_use().returning(|_| Ok(false));

        let allocator = CodeAllocator::with_source(
            Arc::new(repo),
            8,
            scripted(&["123123123", "777777777"]),
        );

        let mut exam = Exam::new("Legacy", ExamCategory::General, 30, "admin-1");
        exam.code = Some("123123123".to_string());

        assert!(allocator.backfill(&mut exam).await.unwrap());
        assert_eq!(exam.login_code.as_deref(), Some("123123123"));
        assert_eq!(exam.code, exam.login_code);
        assert_eq!(exam.resume_code.as_deref(), Some("777777777"));
    }
}
