use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{JwtService, PasswordHasher},
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{
            request::{CredentialsRequest, StudentLoginRequest},
            response::{AuthResponse, UserDto},
        },
    },
    repositories::{ExamRepository, UserRepository},
};

const INVALID_STUDENT_LOGIN: &str = "Invalid registration number or exam code";
const INVALID_REEXAM_CODE: &str = "Invalid exam code for re-exam";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// The three login protocols plus first-admin bootstrap.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    exams: Arc<dyn ExamRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        exams: Arc<dyn ExamRepository>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self { users, exams, jwt }
    }

    /// The exam code is resolved before the registration number is looked
    /// at. Both failures read the same to the caller.
    pub async fn student_login(&self, request: &StudentLoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        if self.exams.find_by_code(&request.exam_code).await?.is_none() {
            log::info!("Student login rejected: exam code matches no exam");
            return Err(AppError::Unauthorized(INVALID_STUDENT_LOGIN.to_string()));
        }

        let user = self
            .users
            .find_by_reg_no(&request.reg_no)
            .await?
            .filter(|user| user.role == UserRole::Student)
            .ok_or_else(|| {
                log::info!("Student login rejected: registration number not registered");
                AppError::Unauthorized(INVALID_STUDENT_LOGIN.to_string())
            })?;

        let token = self.jwt.issue(&user.id, &user.name, UserRole::Student)?;
        log::info!("Student {} logged in", user.id);

        Ok(AuthResponse {
            token,
            user: user.into(),
            exam_id: None,
            exam_type: None,
        })
    }

    /// Like `student_login` but only for resume/reexam exams, and an unknown
    /// registration number is registered on the spot.
    pub async fn reexam_login(&self, request: &StudentLoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let exam = self
            .exams
            .find_by_code(&request.exam_code)
            .await?
            .filter(|exam| exam.accepts_reentry())
            .ok_or_else(|| AppError::Unauthorized(INVALID_REEXAM_CODE.to_string()))?;

        let user = match self.users.find_by_reg_no(&request.reg_no).await? {
            Some(user) => user,
            None => self.register_student(&request.reg_no).await?,
        };

        let token = self.jwt.issue(&user.id, &user.name, UserRole::Student)?;
        log::info!("Student {} logged in for re-exam {}", user.id, exam.id);

        Ok(AuthResponse {
            token,
            user: user.into(),
            exam_id: Some(exam.id),
            exam_type: Some(exam.exam_type),
        })
    }

    async fn register_student(&self, reg_no: &str) -> AppResult<User> {
        match self.users.create(User::student(reg_no, None)).await {
            Ok(user) => {
                log::info!("Self-registered student {}", user.id);
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same regNo.
            Err(AppError::AlreadyExists(_)) => self
                .users
                .find_by_reg_no(reg_no)
                .await?
                .ok_or_else(|| AppError::InternalError("Registered student vanished".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Username/password login for `Faculty` or `Admin`. The token carries
    /// the role stored on the account.
    pub async fn staff_login(
        &self,
        request: &CredentialsRequest,
        role: UserRole,
    ) -> AppResult<AuthResponse> {
        request.validate()?;

        let user = self
            .users
            .find_by_name_and_role(&request.username, role)
            .await?;
        let stored_hash = user.as_ref().and_then(|u| u.password_hash.as_deref());

        if !PasswordHasher::verify(&request.password, stored_hash).await {
            log::info!("Rejected {} login", role);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        let user = user.ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let token = self.jwt.issue_for_user(&user)?;
        log::info!("{} {} logged in", user.role, user.id);

        Ok(AuthResponse {
            token,
            user: user.into(),
            exam_id: None,
            exam_type: None,
        })
    }

    pub async fn admin_exists(&self) -> AppResult<bool> {
        Ok(self.users.count_with_password(UserRole::Admin).await? > 0)
    }

    /// Creates the first admin, or claims a seeded admin that has no
    /// password yet. Refused once any admin has credentials.
    pub async fn admin_setup(&self, request: &CredentialsRequest) -> AppResult<UserDto> {
        request.validate()?;

        let existing = self.users.find_first_by_role(UserRole::Admin).await?;
        if existing.as_ref().is_some_and(User::has_password) {
            return Err(AppError::AlreadyExists("Admin already exists".to_string()));
        }

        let password_hash = PasswordHasher::hash(&request.password).await?;
        let admin = match existing {
            None => {
                self.users
                    .create(User::staff(&request.username, UserRole::Admin, password_hash))
                    .await?
            }
            Some(mut seeded) => {
                seeded.name = request.username.clone();
                seeded.password_hash = Some(password_hash);
                seeded.touch();
                self.users.update(seeded).await?
            }
        };

        log::info!("Admin {} set up", admin.id);
        Ok(admin.into())
    }
}
