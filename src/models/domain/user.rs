use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Faculty,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Faculty => "faculty",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "faculty" => Ok(UserRole::Faculty),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Scheme-tagged hash, see `auth::password`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
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
    pub otp_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: &str, role: UserRole) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            role,
            email: None,
            password_hash: None,
            reg_no: None,
            phone: None,
            department: None,
            year: None,
            section: None,
            otp_code: None,
            otp_expires_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// A student identified by registration number. The display name falls
    /// back to the registration number when none is given.
    pub fn student(reg_no: &str, name: Option<&str>) -> Self {
        let name = name.filter(|n| !n.trim().is_empty()).unwrap_or(reg_no);
        let mut user = User::new(name, UserRole::Student);
        user.reg_no = Some(reg_no.to_string());
        user
    }

    pub fn staff(name: &str, role: UserRole, password_hash: String) -> Self {
        let mut user = User::new(name, role);
        user.password_hash = Some(password_hash);
        user
    }

    pub fn has_password(&self) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| !hash.is_empty())
    }

    pub fn clear_otp(&mut self) {
        self.otp_code = None;
        self.otp_expires_at = None;
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
impl User {
    pub fn assert_fields(&self, name: &str, role: UserRole, reg_no: Option<&str>) {
        assert_eq!(self.name, name);
        assert_eq!(self.role, role);
        assert_eq!(self.reg_no.as_deref(), reg_no);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_creation_defaults_name_to_reg_no() {
        let user = User::student("21CS042", None);
        user.assert_fields("21CS042", UserRole::Student, Some("21CS042"));
        assert!(user.created_at.is_some());
        assert!(!user.has_password());
    }

    #[test]
    fn test_student_creation_with_name() {
        let user = User::student("21CS042", Some("Asha"));
        user.assert_fields("Asha", UserRole::Student, Some("21CS042"));
    }

    #[test]
    fn test_optional_fields_are_omitted_when_unset() {
        let user = User::new("dean", UserRole::Faculty);
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["role"], "faculty");
        assert!(json.get("regNo").is_none());
        assert!(json.get("phone").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!("root".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Faculty.to_string(), "faculty");
    }
}
