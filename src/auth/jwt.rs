use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::{claims::Claims, utils::require_role},
    errors::{AppError, AppResult},
    models::domain::user::{User, UserRole},
};

/// Mints and checks the signed, role-carrying session tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiration_hours: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            expiration_hours,
        }
    }

    pub fn issue(&self, subject: &str, name: &str, role: UserRole) -> AppResult<String> {
        self.sign(&Claims::new(subject, name, role, self.expiration_hours))
    }

    pub fn issue_for_user(&self, user: &User) -> AppResult<String> {
        self.sign(&Claims::for_user(user, self.expiration_hours))
    }

    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Token signature is invalid".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }

    /// Verify the token, then require its role to be one of `allowed`.
    pub fn authorize(&self, token: &str, allowed: &[UserRole]) -> AppResult<Claims> {
        let claims = self.verify(token)?;
        require_role(&claims, allowed)?;
        Ok(claims)
    }
}
