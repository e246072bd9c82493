use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{ExamType, Submission, User, UserRole};

/// Client-facing view of a user. Never carries credential material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            name: user.name,
            role: user.role,
            email: user.email,
            reg_no: user.reg_no,
            phone: user.phone,
            department: user.department,
            year: user.year,
            section: user.section,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

impl OkResponse {
    pub fn ok() -> Self {
        OkResponse { ok: true, user: None }
    }

    pub fn with_user(user: UserDto) -> Self {
        OkResponse {
            ok: true,
            user: Some(user),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminExistsResponse {
    pub exists: bool,
}

/// Who submitted, attached to submissions shown to reviewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterDto {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_no: Option<String>,
}

impl From<&User> for SubmitterDto {
    fn from(user: &User) -> Self {
        SubmitterDto {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            reg_no: user.reg_no.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter: Option<SubmitterDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dto_hides_password_hash() {
        let user = User::staff("dean", UserRole::Faculty, "argon2id:00:00".to_string());

        let dto: UserDto = user.into();
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["name"], "dean");
        assert_eq!(json["role"], "faculty");
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_submission_detail_flattens_submission_fields() {
        let submission = Submission::new("exam-1", "user-1", Vec::new(), 0);
        let student = User::student("21CS042", Some("Asha"));

        let detail = SubmissionDetail {
            submission,
            submitter: Some(SubmitterDto::from(&student)),
        };
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["exam"], "exam-1");
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["submitter"]["regNo"], "21CS042");
    }
}
