/// Auth Service
///
/// Orchestrates signup, login, token refresh, email verification, and
/// password recovery on top of the password hasher, the token codec, the
/// rate limiter, and the user store. This is the whole token lifecycle:
/// tokens are minted here, fingerprinted here, and rotated or revoked
/// here; the route layer only translates HTTP to these calls.

use std::sync::Arc;

use crate::auth::claims::TokenPurpose;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{issue_token, token_fingerprint, verify_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::rate_limit::RateLimiter;
use crate::store::{User, UserStore, VerifyOutcome};
use crate::validators::{is_valid_email, is_valid_name};

/// An access/refresh token pair minted together; both carry the same
/// subject.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    store: Arc<UserStore>,
    limiter: RateLimiter,
    jwt: JwtSettings,
}

impl AuthService {
    pub fn new(store: Arc<UserStore>, limiter: RateLimiter, jwt: JwtSettings) -> Self {
        Self { store, limiter, jwt }
    }

    pub fn jwt_settings(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Register a new, unverified account.
    ///
    /// Returns the created user and a verify-email token for the
    /// confirmation link. The caller decides how to deliver it.
    pub fn signup(&self, email: &str, name: &str, password: &str) -> Result<(User, String), AppError> {
        let email = is_valid_email(email)?;
        let name = is_valid_name(name)?;
        let password_hash = hash_password(password)?;

        let user = self.store.insert(&email, &name, &password_hash)?;
        let verify_token = issue_token(
            &email,
            TokenPurpose::VerifyEmail,
            self.jwt.verify_token_expiry,
            &self.jwt,
        )?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, verify_token))
    }

    /// Authenticate with email and password; issue a token pair.
    ///
    /// Unknown email and wrong password produce the same
    /// `InvalidCredentials` so responses never reveal which accounts
    /// exist. An unverified account is rejected with the specific
    /// `UserNotVerified` reason and never receives tokens.
    pub fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let email = is_valid_email(email)?;

        if !self.limiter.allow(&email) {
            return Err(AppError::Auth(AuthError::RateLimited));
        }

        let user = self
            .store
            .find(&email)
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        if !user.verified {
            return Err(AppError::Auth(AuthError::UserNotVerified));
        }

        let pair = self.issue_pair(&email)?;
        self.store
            .set_refresh_fingerprint(&email, Some(token_fingerprint(&pair.refresh_token)));

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// Rotate a refresh token: verify it, swap its fingerprint for the
    /// successor's, and issue a fresh pair.
    ///
    /// A refresh token mints at most one successor. Presenting a
    /// superseded token fails with `TokenAlreadyUsed`, does not rotate,
    /// and revokes the live session (reuse means theft or a stale
    /// client).
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = verify_token(refresh_token, TokenPurpose::Refresh, &self.jwt)?;
        let presented = token_fingerprint(refresh_token);

        let pair = self.issue_pair(&claims.sub)?;
        self.store.rotate_refresh_fingerprint(
            &claims.sub,
            &presented,
            token_fingerprint(&pair.refresh_token),
        )?;

        tracing::info!(subject = %claims.sub, "Refresh token rotated");
        Ok(pair)
    }

    /// Confirm an email address with a verify-email token, one time only.
    pub fn verify_email(&self, token: &str) -> Result<(), AppError> {
        let claims = verify_token(token, TokenPurpose::VerifyEmail, &self.jwt)?;

        match self.store.mark_verified(&claims.sub) {
            VerifyOutcome::Verified => {
                tracing::info!(subject = %claims.sub, "Email verified");
                Ok(())
            }
            VerifyOutcome::AlreadyVerified => Err(AppError::Auth(AuthError::TokenAlreadyUsed)),
            VerifyOutcome::NoSuchUser => Err(AppError::Auth(AuthError::TokenInvalid)),
        }
    }

    /// Issue a fresh verify-email token for an account that never
    /// confirmed. Returns None for unknown or already-verified accounts
    /// so the caller can answer identically in all cases.
    pub fn resend_verification(&self, email: &str) -> Result<Option<(User, String)>, AppError> {
        let email = is_valid_email(email)?;

        match self.store.find(&email) {
            Some(user) if !user.verified => {
                let token = issue_token(
                    &email,
                    TokenPurpose::VerifyEmail,
                    self.jwt.verify_token_expiry,
                    &self.jwt,
                )?;
                Ok(Some((user, token)))
            }
            _ => Ok(None),
        }
    }

    /// Begin password recovery. Returns a reset token when the account
    /// exists, None otherwise; either way the HTTP answer looks the same.
    /// A newer request supersedes any earlier outstanding reset token.
    pub fn request_password_reset(&self, email: &str) -> Result<Option<(User, String)>, AppError> {
        let email = is_valid_email(email)?;

        if !self.limiter.allow(&email) {
            return Err(AppError::Auth(AuthError::RateLimited));
        }

        match self.store.find(&email) {
            None => Ok(None),
            Some(user) => {
                let token = issue_token(
                    &email,
                    TokenPurpose::ResetPassword,
                    self.jwt.reset_token_expiry,
                    &self.jwt,
                )?;
                self.store
                    .set_reset_fingerprint(&email, token_fingerprint(&token));
                tracing::info!(user_id = %user.id, "Password reset requested");
                Ok(Some((user, token)))
            }
        }
    }

    /// Complete password recovery with a one-time reset token.
    ///
    /// On success every prior refresh token is invalidated; the user must
    /// log in again with the new password.
    pub fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let claims = verify_token(token, TokenPurpose::ResetPassword, &self.jwt)?;
        let new_hash = hash_password(new_password)?;

        self.store
            .reset_password(&claims.sub, &token_fingerprint(token), &new_hash)?;

        tracing::info!(subject = %claims.sub, "Password reset completed");
        Ok(())
    }

    /// Look up the account behind a validated access token's subject.
    pub fn current_user(&self, email: &str) -> Result<User, AppError> {
        self.store
            .find(email)
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    fn issue_pair(&self, subject: &str) -> Result<TokenPair, AppError> {
        let access_token = issue_token(
            subject,
            TokenPurpose::Access,
            self.jwt.access_token_expiry,
            &self.jwt,
        )?;
        let refresh_token = issue_token(
            subject,
            TokenPurpose::Refresh,
            self.jwt.refresh_token_expiry,
            &self.jwt,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_token_expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::RateLimitSettings;

    fn test_jwt() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            verify_token_expiry: 86400,
            reset_token_expiry: 900,
            issuer: "test".to_string(),
        }
    }

    fn service_with_limit(max_attempts: u32) -> AuthService {
        let limiter = RateLimiter::new(&RateLimitSettings {
            max_attempts,
            window_seconds: 3600,
        });
        AuthService::new(Arc::new(UserStore::new()), limiter, test_jwt())
    }

    fn service() -> AuthService {
        service_with_limit(100)
    }

    fn signup_verified(svc: &AuthService, email: &str, password: &str) {
        let (_, verify_token) = svc.signup(email, "Test User", password).expect("signup failed");
        svc.verify_email(&verify_token).expect("verification failed");
    }

    #[test]
    fn test_signup_duplicate_email_rejected() {
        let svc = service();
        svc.signup("user@example.com", "User", "ValidPassword123")
            .expect("signup failed");

        let result = svc.signup("user@example.com", "Other", "ValidPassword123");
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::UserAlreadyExists))
        ));
    }

    #[test]
    fn test_login_unverified_user_rejected() {
        let svc = service();
        svc.signup("user@example.com", "User", "ValidPassword123")
            .expect("signup failed");

        // Correct password, but the account never confirmed its email
        let result = svc.login("user@example.com", "ValidPassword123");
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::UserNotVerified))
        ));
    }

    #[test]
    fn test_login_after_verification_issues_matching_pair() {
        let svc = service();
        signup_verified(&svc, "user@example.com", "ValidPassword123");

        let pair = svc
            .login("user@example.com", "ValidPassword123")
            .expect("login failed");

        let access = verify_token(&pair.access_token, TokenPurpose::Access, svc.jwt_settings())
            .expect("access token invalid");
        let refresh = verify_token(&pair.refresh_token, TokenPurpose::Refresh, svc.jwt_settings())
            .expect("refresh token invalid");

        // Pair invariant: both tokens share the subject
        assert_eq!(access.sub, refresh.sub);
        assert_eq!(access.sub, "user@example.com");
    }

    #[test]
    fn test_login_wrong_password_and_unknown_email_look_identical() {
        let svc = service();
        signup_verified(&svc, "user@example.com", "ValidPassword123");

        let wrong_password = svc.login("user@example.com", "WrongPassword123");
        let unknown_email = svc.login("ghost@example.com", "ValidPassword123");

        assert!(matches!(
            wrong_password,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            unknown_email,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[test]
    fn test_refresh_rotation_supersedes_old_token() {
        let svc = service();
        signup_verified(&svc, "user@example.com", "ValidPassword123");

        let pair = svc
            .login("user@example.com", "ValidPassword123")
            .expect("login failed");

        let rotated = svc.refresh(&pair.refresh_token).expect("refresh failed");
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // Second spend of the original token must fail and not rotate
        let reused = svc.refresh(&pair.refresh_token);
        assert!(matches!(
            reused,
            Err(AppError::Auth(AuthError::TokenAlreadyUsed))
        ));

        // Reuse revoked the live session as well
        let after_reuse = svc.refresh(&rotated.refresh_token);
        assert!(matches!(
            after_reuse,
            Err(AppError::Auth(AuthError::TokenAlreadyUsed))
        ));
    }

    #[test]
    fn test_access_token_cannot_refresh() {
        let svc = service();
        signup_verified(&svc, "user@example.com", "ValidPassword123");
        let pair = svc
            .login("user@example.com", "ValidPassword123")
            .expect("login failed");

        let result = svc.refresh(&pair.access_token);
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::TokenWrongPurpose))
        ));
    }

    #[test]
    fn test_verify_email_token_is_one_time() {
        let svc = service();
        let (_, verify_token) = svc
            .signup("user@example.com", "User", "ValidPassword123")
            .expect("signup failed");

        svc.verify_email(&verify_token).expect("first use failed");
        let second = svc.verify_email(&verify_token);
        assert!(matches!(
            second,
            Err(AppError::Auth(AuthError::TokenAlreadyUsed))
        ));
    }

    #[test]
    fn test_resend_verification_silent_for_unknown_and_verified() {
        let svc = service();
        signup_verified(&svc, "verified@example.com", "ValidPassword123");
        svc.signup("pending@example.com", "User", "ValidPassword123")
            .expect("signup failed");

        assert!(svc.resend_verification("ghost@example.com").unwrap().is_none());
        assert!(svc.resend_verification("verified@example.com").unwrap().is_none());
        assert!(svc.resend_verification("pending@example.com").unwrap().is_some());
    }

    #[test]
    fn test_login_rate_limited_per_email() {
        let svc = service_with_limit(2);
        signup_verified(&svc, "user@example.com", "ValidPassword123");

        for _ in 0..2 {
            let result = svc.login("user@example.com", "WrongPassword123");
            assert!(matches!(
                result,
                Err(AppError::Auth(AuthError::InvalidCredentials))
            ));
        }

        // Third attempt in the window is over budget, even with the
        // correct password
        let result = svc.login("user@example.com", "ValidPassword123");
        assert!(matches!(result, Err(AppError::Auth(AuthError::RateLimited))));
    }

    #[test]
    fn test_password_reset_invalidates_prior_refresh_tokens() {
        let svc = service();
        signup_verified(&svc, "user@example.com", "ValidPassword123");

        let pair = svc
            .login("user@example.com", "ValidPassword123")
            .expect("login failed");

        let (_, reset_token) = svc
            .request_password_reset("user@example.com")
            .expect("request failed")
            .expect("expected a reset token");

        svc.confirm_password_reset(&reset_token, "NewPassword456")
            .expect("reset failed");

        // All prior refresh tokens are dead
        let result = svc.refresh(&pair.refresh_token);
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::TokenAlreadyUsed))
        ));

        // Old password is gone, new one works
        assert!(matches!(
            svc.login("user@example.com", "ValidPassword123"),
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
        svc.login("user@example.com", "NewPassword456")
            .expect("login with new password failed");
    }

    #[test]
    fn test_reset_token_is_one_time() {
        let svc = service();
        signup_verified(&svc, "user@example.com", "ValidPassword123");

        let (_, reset_token) = svc
            .request_password_reset("user@example.com")
            .expect("request failed")
            .expect("expected a reset token");

        svc.confirm_password_reset(&reset_token, "NewPassword456")
            .expect("first reset failed");

        let second = svc.confirm_password_reset(&reset_token, "AnotherPassword789");
        assert!(matches!(
            second,
            Err(AppError::Auth(AuthError::TokenAlreadyUsed))
        ));
    }

    #[test]
    fn test_reset_request_silent_for_unknown_account() {
        let svc = service();
        let result = svc.request_password_reset("ghost@example.com").unwrap();
        assert!(result.is_none());
    }
}
