#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;

use online_exam_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{Exam, Submission, User, UserRole},
    repositories::{ExamRepository, SubmissionRepository, UserRepository},
};

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "online-exam-it".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 4000,
        client_origin: "http://localhost:5173".to_string(),
        jwt_secret: SecretString::from("integration_test_secret_key".to_string()),
        jwt_expiration_hours: 24 * 7,
        code_allocation_max_draws: 64,
    }
}

pub struct InMemoryStore {
    pub users: Arc<InMemoryUserRepository>,
    pub exams: Arc<InMemoryExamRepository>,
    pub submissions: Arc<InMemorySubmissionRepository>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            exams: Arc::new(InMemoryExamRepository::new()),
            submissions: Arc::new(InMemorySubmissionRepository::new()),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::from_repositories(
            test_config(),
            self.users.clone(),
            self.exams.clone(),
            self.submissions.clone(),
        )
    }
}

pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    fn check_unique(users: &HashMap<String, User>, user: &User) -> AppResult<()> {
        let clash = users.values().filter(|u| u.id != user.id).any(|u| {
            (user.reg_no.is_some() && u.reg_no == user.reg_no)
                || (user.phone.is_some() && u.phone == user.phone)
        });
        if clash {
            return Err(AppError::AlreadyExists(format!(
                "User '{}' clashes with an existing regNo or phone",
                user.name
            )));
        }
        Ok(())
    }

    fn sorted(mut users: Vec<User>) -> Vec<User> {
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        users
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AppError::AlreadyExists(format!(
                "User with id '{}' already exists",
                user.id
            )));
        }
        Self::check_unique(&users, &user)?;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: Vec<String>) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_reg_no(&self, reg_no: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reg_no.as_deref() == Some(reg_no))
            .cloned())
    }

    async fn find_by_name_and_role(&self, name: &str, role: UserRole) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.name == name && u.role == role)
            .cloned())
    }

    async fn find_first_by_role(&self, role: UserRole) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        let matching = users.values().filter(|u| u.role == role).cloned().collect();
        Ok(Self::sorted(matching).into_iter().next())
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let matching = users.values().filter(|u| u.role == role).cloned().collect();
        Ok(Self::sorted(matching))
    }

    async fn count_with_password(&self, role: UserRole) -> AppResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.role == role && u.has_password())
            .count() as u64)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }
        Self::check_unique(&users, &user)?;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete_by_id_and_role(&self, id: &str, role: UserRole) -> AppResult<bool> {
        let mut users = self.users.write().await;
        match users.get(id) {
            Some(user) if user.role == role => {
                users.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryExamRepository {
    exams: RwLock<HashMap<String, Exam>>,
}

impl InMemoryExamRepository {
    pub fn new() -> Self {
        Self {
            exams: RwLock::new(HashMap::new()),
        }
    }

    /// Every exam must own its codes outright, whatever slot another exam
    /// holds them in.
    fn check_codes(exams: &HashMap<String, Exam>, exam: &Exam) -> AppResult<()> {
        for other in exams.values().filter(|e| e.id != exam.id) {
            if let Some(code) = exam.codes().find(|code| other.matches_code(code)) {
                return Err(AppError::AlreadyExists(format!(
                    "Exam code '{}' already in use",
                    code
                )));
            }
        }
        Ok(())
    }

    fn newest_first(mut exams: Vec<Exam>) -> Vec<Exam> {
        exams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        exams
    }
}

#[async_trait]
impl ExamRepository for InMemoryExamRepository {
    async fn create(&self, exam: Exam) -> AppResult<Exam> {
        let mut exams = self.exams.write().await;
        if exams.contains_key(&exam.id) {
            return Err(AppError::AlreadyExists(format!(
                "Exam with id '{}' already exists",
                exam.id
            )));
        }
        Self::check_codes(&exams, &exam)?;
        exams.insert(exam.id.clone(), exam.clone());
        Ok(exam)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Exam>> {
        Ok(self.exams.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Exam>> {
        let exams = self.exams.read().await;
        Ok(exams.values().find(|e| e.matches_code(code)).cloned())
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<Exam>> {
        let exams = self.exams.read().await;
        Ok(exams.values().find(|e| e.title == title).cloned())
    }

    async fn code_in_use(&self, code: &str) -> AppResult<bool> {
        let exams = self.exams.read().await;
        Ok(exams.values().any(|e| e.matches_code(code)))
    }

    async fn list_all(&self) -> AppResult<Vec<Exam>> {
        let exams = self.exams.read().await;
        Ok(Self::newest_first(exams.values().cloned().collect()))
    }

    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Exam>> {
        let exams = self.exams.read().await;
        Ok(Self::newest_first(
            exams
                .values()
                .filter(|e| e.is_owned_by(user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, exam: Exam) -> AppResult<Exam> {
        let mut exams = self.exams.write().await;
        if !exams.contains_key(&exam.id) {
            return Err(AppError::NotFound(format!(
                "Exam with id '{}' not found",
                exam.id
            )));
        }
        Self::check_codes(&exams, &exam)?;
        exams.insert(exam.id.clone(), exam.clone());
        Ok(exam)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.exams.write().await.remove(id).is_some())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemorySubmissionRepository {
    submissions: RwLock<HashMap<String, Submission>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self {
            submissions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn create(&self, submission: Submission) -> AppResult<Submission> {
        let mut submissions = self.submissions.write().await;
        if submissions.contains_key(&submission.id) {
            return Err(AppError::AlreadyExists(format!(
                "Submission with id '{}' already exists",
                submission.id
            )));
        }
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Submission>> {
        Ok(self.submissions.read().await.get(id).cloned())
    }

    async fn find_by_exam_and_user(
        &self,
        exam_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .filter(|s| s.exam == exam_id && s.user == user_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .cloned())
    }

    async fn list_by_exam(&self, exam_id: &str) -> AppResult<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        let mut items: Vec<Submission> = submissions
            .values()
            .filter(|s| s.exam == exam_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn update_versioned(
        &self,
        submission: Submission,
        expected_version: i64,
    ) -> AppResult<Submission> {
        let mut submissions = self.submissions.write().await;
        let Some(stored) = submissions.get(&submission.id) else {
            return Err(AppError::NotFound(format!(
                "Submission with id '{}' not found",
                submission.id
            )));
        };
        if stored.version != expected_version {
            return Err(AppError::Conflict(format!(
                "Submission '{}' was modified concurrently",
                submission.id
            )));
        }
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}
