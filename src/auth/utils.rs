use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::user::UserRole,
};

pub fn require_role(claims: &Claims, allowed: &[UserRole]) -> AppResult<()> {
    if !claims.has_role(allowed) {
        return Err(AppError::Forbidden(format!(
            "Role '{}' may not perform this action",
            claims.role
        )));
    }
    Ok(())
}

/// Admins pass unconditionally; everyone else must own the resource.
pub fn require_owner_or_admin(claims: &Claims, resource_owner: Option<&str>) -> AppResult<()> {
    if claims.role != UserRole::Admin && resource_owner != Some(claims.sub.as_str()) {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}
