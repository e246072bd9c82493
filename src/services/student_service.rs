use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{
            request::{AddStudentRequest, UpdateProfileRequest},
            response::UserDto,
        },
    },
    repositories::UserRepository,
};

pub struct StudentService {
    users: Arc<dyn UserRepository>,
}

impl StudentService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn find_student(&self, user_id: &str) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.role == UserRole::Student)
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: &str) -> AppResult<UserDto> {
        Ok(self.find_student(user_id).await?.into())
    }

    /// Only the profile fields present in `request` change; identity fields
    /// (role, registration number, credentials) are never writable here.
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<UserDto> {
        request.validate()?;

        let mut student = self.find_student(user_id).await?;
        let UpdateProfileRequest {
            name,
            email,
            phone,
            department,
            year,
            section,
        } = request;

        if let Some(name) = name {
            student.name = name;
        }
        if email.is_some() {
            student.email = email;
        }
        if phone.is_some() {
            student.phone = phone;
        }
        if department.is_some() {
            student.department = department;
        }
        if year.is_some() {
            student.year = year;
        }
        if section.is_some() {
            student.section = section;
        }
        student.touch();

        let student = self.users.update(student).await?;
        Ok(student.into())
    }

    pub async fn list_students(&self) -> AppResult<Vec<UserDto>> {
        let students = self.users.list_by_role(UserRole::Student).await?;
        Ok(students.into_iter().map(UserDto::from).collect())
    }

    pub async fn add_student(&self, request: &AddStudentRequest) -> AppResult<UserDto> {
        request.validate()?;

        if self.users.find_by_reg_no(&request.reg_no).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Student already registered".to_string(),
            ));
        }

        let student = self
            .users
            .create(User::student(&request.reg_no, request.name.as_deref()))
            .await?;

        log::info!("Registered student {}", student.id);
        Ok(student.into())
    }

    pub async fn delete_student(&self, id: &str) -> AppResult<()> {
        if !self.users.delete_by_id_and_role(id, UserRole::Student).await? {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        log::info!("Deleted student {}", id);
        Ok(())
    }
}
