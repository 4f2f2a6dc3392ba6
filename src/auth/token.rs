/// Token issuance and verification
///
/// Signs and verifies the compact claim sets used for API access,
/// refresh rotation, email verification, and password recovery. Rejection
/// is deterministic: tampering or a wrong issuer yields `TokenInvalid`,
/// expiry yields `TokenExpired`, a purpose mismatch yields
/// `TokenWrongPurpose`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};

use crate::auth::claims::{Claims, TokenPurpose};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Tolerated clock skew between issuer and verifier, in seconds
const CLOCK_SKEW_LEEWAY_SECONDS: u64 = 5;

/// Sign a new token for a subject with the given purpose and lifetime
///
/// # Errors
/// Returns error if signing fails
pub fn issue_token(
    subject: &str,
    purpose: TokenPurpose,
    ttl_seconds: i64,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(
        subject.to_string(),
        purpose,
        ttl_seconds,
        config.issuer.clone(),
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify a token and check it was minted for the expected purpose
///
/// # Errors
/// - `TokenExpired` if past expiry (beyond the skew leeway)
/// - `TokenWrongPurpose` if valid but minted for another operation
/// - `TokenInvalid` for tampered signatures, garbage input, or wrong issuer
pub fn verify_token(
    token: &str,
    expected_purpose: TokenPurpose,
    config: &JwtSettings,
) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = CLOCK_SKEW_LEEWAY_SECONDS;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "Token validation failed");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Auth(AuthError::TokenExpired)
            }
            _ => AppError::Auth(AuthError::TokenInvalid),
        }
    })?;

    if claims.purpose != expected_purpose {
        tracing::warn!(
            expected = %expected_purpose,
            actual = %claims.purpose,
            "Token presented for wrong purpose"
        );
        return Err(AppError::Auth(AuthError::TokenWrongPurpose));
    }

    Ok(claims)
}

/// SHA-256 fingerprint of a compact token
///
/// The store keeps fingerprints, never the tokens themselves.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
