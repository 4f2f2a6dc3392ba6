/// Token claims structure
///
/// Payload of every token the service issues: standard JWT claims
/// (RFC 7519) plus a `purpose` discriminant so a token minted for one
/// operation can never be replayed against another.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

/// What a token is allowed to be used for
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    VerifyEmail,
    ResetPassword,
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPurpose::Access => write!(f, "access"),
            TokenPurpose::Refresh => write!(f, "refresh"),
            TokenPurpose::VerifyEmail => write!(f, "verify_email"),
            TokenPurpose::ResetPassword => write!(f, "reset_password"),
        }
    }
}

/// Signed claim set for all token purposes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's email (unique account identity)
    pub sub: String,
    /// What this token may be used for
    pub purpose: TokenPurpose,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Random nonce; makes two tokens minted in the same second distinct
    pub jti: String,
}

impl Claims {
    pub fn new(subject: String, purpose: TokenPurpose, ttl_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        let jti: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Self {
            sub: subject,
            purpose,
            exp: now + ttl_seconds,
            iat: now,
            iss: issuer,
            jti,
        }
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(
            "user@example.com".to_string(),
            TokenPurpose::Access,
            3600,
            "test".to_string(),
        );

        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.purpose, TokenPurpose::Access);
        assert_eq!(claims.iss, "test");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_purpose_serializes_as_snake_case() {
        let json = serde_json::to_string(&TokenPurpose::VerifyEmail).unwrap();
        assert_eq!(json, "\"verify_email\"");
        let json = serde_json::to_string(&TokenPurpose::ResetPassword).unwrap();
        assert_eq!(json, "\"reset_password\"");
    }

    #[test]
    fn test_jti_is_unique_per_token() {
        let a = Claims::new("s".to_string(), TokenPurpose::Refresh, 60, "test".to_string());
        let b = Claims::new("s".to_string(), TokenPurpose::Refresh, 60, "test".to_string());
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let claims = Claims::new(
            "user@example.com".to_string(),
            TokenPurpose::Access,
            -120,
            "test".to_string(),
        );
        assert!(claims.is_expired());
    }
}
