use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};

use crate::{
    app_state::AppState,
    auth::{utils::require_role, Claims},
    errors::{AppError, AppResult},
    models::domain::user::UserRole,
};

/// Extractor for the caller's verified session. A missing or malformed
/// bearer header, a bad signature and an expired token all reject with
/// `Unauthorized` before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    /// Role gate for handlers; a valid session with the wrong role is `Forbidden`.
    pub fn require(&self, allowed: &[UserRole]) -> AppResult<&Claims> {
        require_role(&self.0, allowed)?;
        Ok(&self.0)
    }
}

fn authenticate(req: &HttpRequest) -> AppResult<AuthenticatedUser> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("Session issuer not configured".to_string()))?;

    let header = Authorization::<Bearer>::parse(req).map_err(|_| {
        AppError::Unauthorized("Missing or malformed bearer token".to_string())
    })?;
    let bearer = header.into_scheme();

    let claims = state.jwt_service.verify(bearer.token())?;
    Ok(AuthenticatedUser(claims))
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
