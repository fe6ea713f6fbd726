use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use secrecy::ExposeSecret;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Why a token failed verification. Revocation state is deliberately not part
/// of this type: the blacklist is the caller's concern, not the signer's.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("token is malformed or carries an invalid signature")]
    Malformed,
    #[error("token has expired")]
    Expired,
}

impl From<VerificationFailure> for AppError {
    fn from(_: VerificationFailure) -> Self {
        AppError::unauthorized()
    }
}

pub fn issue(user_id: Uuid, secret: &secrecy::SecretString, ttl: Duration) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let exp = now + ttl.whole_seconds();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp,
    };
    let header = Header::new(Algorithm::HS256);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify(token: &str, secret: &secrecy::SecretString) -> Result<Claims, VerificationFailure> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerificationFailure::Expired,
        _ => VerificationFailure::Malformed,
    })
}

/// Decode claims without checking the signature or expiry.
///
/// Only for revocation bookkeeping on sign-out, where an already-expired
/// token must still be accepted. Never use this to authenticate.
pub fn decode_unverified(token: &str) -> Result<Claims, VerificationFailure> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(b"ignored"), // Key is ignored when validation is disabled
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| VerificationFailure::Malformed)
}
