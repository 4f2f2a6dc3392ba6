/// In-memory user store
///
/// Key-value user mapping keyed by email, owned by the auth service.
/// Every operation takes the map lock once, so per-user updates are
/// atomic: a refresh token cannot be double-spent by concurrent requests
/// racing on the fingerprint swap.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// User account record
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub verified: bool,
    /// Fingerprint of the one live refresh token; None means no session
    pub refresh_fingerprint: Option<String>,
    /// Fingerprint of the outstanding password-reset token, if any
    pub reset_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of marking a user verified
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
    NoSuchUser,
}

pub struct UserStore {
    users: Mutex<HashMap<String, User>>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Create a new, unverified user
    ///
    /// # Errors
    /// `UserAlreadyExists` if the email is taken
    pub fn insert(&self, email: &str, name: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();

        if users.contains_key(email) {
            return Err(AppError::Auth(AuthError::UserAlreadyExists));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            verified: false,
            refresh_fingerprint: None,
            reset_fingerprint: None,
            created_at: Utc::now(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    pub fn find(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().get(email).cloned()
    }

    /// Flip the verification flag, one time only
    pub fn mark_verified(&self, email: &str) -> VerifyOutcome {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(email) {
            None => VerifyOutcome::NoSuchUser,
            Some(user) if user.verified => VerifyOutcome::AlreadyVerified,
            Some(user) => {
                user.verified = true;
                VerifyOutcome::Verified
            }
        }
    }

    /// Record the fingerprint of a freshly issued refresh token
    pub fn set_refresh_fingerprint(&self, email: &str, fingerprint: Option<String>) -> bool {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(email) {
            Some(user) => {
                user.refresh_fingerprint = fingerprint;
                true
            }
            None => false,
        }
    }

    /// Compare-and-swap the refresh fingerprint (token rotation)
    ///
    /// On mismatch the stored fingerprint is cleared: a reused refresh
    /// token means either theft or a stale client, and the live session
    /// is revoked so neither party keeps access.
    ///
    /// # Errors
    /// - `TokenAlreadyUsed` if the presented fingerprint is not the live one
    /// - `TokenInvalid` if the subject does not exist
    pub fn rotate_refresh_fingerprint(
        &self,
        email: &str,
        expected: &str,
        new: String,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(email)
            .ok_or(AppError::Auth(AuthError::TokenInvalid))?;

        match user.refresh_fingerprint.as_deref() {
            Some(current) if current == expected => {
                user.refresh_fingerprint = Some(new);
                Ok(())
            }
            _ => {
                user.refresh_fingerprint = None;
                Err(AppError::Auth(AuthError::TokenAlreadyUsed))
            }
        }
    }

    /// Record the fingerprint of an outstanding reset token, superseding
    /// any earlier one
    pub fn set_reset_fingerprint(&self, email: &str, fingerprint: String) -> bool {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(email) {
            Some(user) => {
                user.reset_fingerprint = Some(fingerprint);
                true
            }
            None => false,
        }
    }

    /// Complete a password reset in one atomic step: consume the reset
    /// fingerprint, install the new hash, and clear the refresh
    /// fingerprint so every prior session must log in again.
    ///
    /// # Errors
    /// - `TokenAlreadyUsed` if the reset token was already consumed or superseded
    /// - `TokenInvalid` if the subject does not exist
    pub fn reset_password(
        &self,
        email: &str,
        expected_fingerprint: &str,
        new_password_hash: &str,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(email)
            .ok_or(AppError::Auth(AuthError::TokenInvalid))?;

        match user.reset_fingerprint.as_deref() {
            Some(current) if current == expected_fingerprint => {
                user.password_hash = new_password_hash.to_string();
                user.reset_fingerprint = None;
                user.refresh_fingerprint = None;
                Ok(())
            }
            _ => Err(AppError::Auth(AuthError::TokenAlreadyUsed)),
        }
    }
}
