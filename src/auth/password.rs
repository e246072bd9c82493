//! Salted, memory-hard password hashing for staff credentials.
//!
//! Stored form is `<scheme>:<salt hex>:<digest hex>`. Verification never
//! fails loudly: unknown schemes and malformed hashes simply do not verify.

use argon2::Argon2;
use once_cell::sync::Lazy;
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppResult};

pub const SCHEME: &str = "argon2id";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 64;

/// Checked against when no account matches, so a missing user costs the
/// same as a wrong password.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| hash_password("unused").unwrap_or_default());

fn derive(password: &[u8], salt: &[u8], len: usize) -> Result<Vec<u8>, argon2::Error> {
    let mut digest = vec![0u8; len];
    Argon2::default().hash_password_into(password, salt, &mut digest)?;
    Ok(digest)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let digest = derive(password.as_bytes(), &salt, DIGEST_LEN)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    Ok(format!(
        "{}:{}:{}",
        SCHEME,
        hex::encode(salt),
        hex::encode(digest)
    ))
}

pub fn verify_password(password: &str, tagged_hash: &str) -> bool {
    let mut parts = tagged_hash.split(':');
    let (Some(scheme), Some(salt_hex), Some(digest_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if scheme != SCHEME {
        return false;
    }

    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    if expected.is_empty() {
        return false;
    }

    match derive(password.as_bytes(), &salt, expected.len()) {
        Ok(derived) => derived.ct_eq(&expected).into(),
        Err(_) => false,
    }
}

/// Async front for the hasher; derivation runs on the blocking pool.
pub struct PasswordHasher;

impl PasswordHasher {
    pub async fn hash(password: &str) -> AppResult<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {}", e)))?
    }

    /// `None` as the stored hash still pays for one derivation.
    pub async fn verify(password: &str, tagged_hash: Option<&str>) -> bool {
        let found = tagged_hash.is_some();
        let password = password.to_string();
        let tagged_hash = tagged_hash
            .map(str::to_string)
            .unwrap_or_else(|| DUMMY_HASH.clone());

        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &tagged_hash))
            .await
            .unwrap_or(false);

        found && verified
    }
}
