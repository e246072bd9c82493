use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::PasswordHasher,
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{
            request::{CredentialsRequest, FacultyCredentialsRequest},
            response::UserDto,
        },
    },
    repositories::UserRepository,
};

/// Admin-only management of faculty and admin accounts.
pub struct StaffService {
    users: Arc<dyn UserRepository>,
}

impl StaffService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Creates the faculty account if needed and (re)sets its password.
    /// Any pending one-time password is discarded.
    pub async fn set_faculty_credentials(
        &self,
        request: &FacultyCredentialsRequest,
    ) -> AppResult<UserDto> {
        request.validate()?;

        let existing = self
            .users
            .find_by_name_and_role(&request.username, UserRole::Faculty)
            .await?;
        let is_new = existing.is_none();
        let mut faculty =
            existing.unwrap_or_else(|| User::new(&request.username, UserRole::Faculty));

        faculty.password_hash = Some(PasswordHasher::hash(&request.password).await?);
        if let Some(phone) = request.phone.as_deref().filter(|p| !p.is_empty()) {
            faculty.phone = Some(phone.to_string());
        }
        faculty.clear_otp();
        faculty.touch();

        let faculty = if is_new {
            self.users.create(faculty).await?
        } else {
            self.users.update(faculty).await?
        };

        log::info!("Credentials set for faculty {}", faculty.id);
        Ok(faculty.into())
    }

    pub async fn list_faculty(&self) -> AppResult<Vec<UserDto>> {
        let faculty = self.users.list_by_role(UserRole::Faculty).await?;
        Ok(faculty.into_iter().map(UserDto::from).collect())
    }

    pub async fn delete_faculty(&self, id: &str) -> AppResult<()> {
        if !self.users.delete_by_id_and_role(id, UserRole::Faculty).await? {
            return Err(AppError::NotFound("Faculty not found".to_string()));
        }
        log::info!("Deleted faculty {}", id);
        Ok(())
    }

    pub async fn list_admins(&self) -> AppResult<Vec<UserDto>> {
        let admins = self.users.list_by_role(UserRole::Admin).await?;
        Ok(admins.into_iter().map(UserDto::from).collect())
    }

    pub async fn add_admin(&self, request: &CredentialsRequest) -> AppResult<UserDto> {
        request.validate()?;

        if self
            .users
            .find_by_name_and_role(&request.username, UserRole::Admin)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Admin username already exists".to_string(),
            ));
        }

        let password_hash = PasswordHasher::hash(&request.password).await?;
        let admin = self
            .users
            .create(User::staff(&request.username, UserRole::Admin, password_hash))
            .await?;

        log::info!("Added admin {}", admin.id);
        Ok(admin.into())
    }

    /// `caller_id` is the admin making the request, who cannot remove themself.
    pub async fn delete_admin(&self, caller_id: &str, id: &str) -> AppResult<()> {
        if caller_id == id {
            return Err(AppError::ValidationError(
                "Cannot delete current admin".to_string(),
            ));
        }
        if !self.users.delete_by_id_and_role(id, UserRole::Admin).await? {
            return Err(AppError::NotFound("Admin not found".to_string()));
        }
        log::info!("Deleted admin {}", id);
        Ok(())
    }
}
