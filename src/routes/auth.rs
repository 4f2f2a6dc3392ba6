/// Authentication Routes
///
/// Thin HTTP glue: each handler translates a request into one auth
/// service call and the result into a response. Emails are spawned
/// fire-and-forget; delivery failures are logged, never surfaced.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, Claims};
use crate::configuration::ApplicationSettings;
use crate::email_client::EmailClient;
use crate::error::AppError;

/// User registration request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ConfirmResetRequest {
    pub token: String,
    pub new_password: String,
}

/// Authentication response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User information response
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub verified: bool,
    pub created_at: String,
}

impl From<crate::store::User> for UserResponse {
    fn from(user: crate::store::User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            verified: user.verified,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<crate::auth::TokenPair> for AuthResponse {
    fn from(pair: crate::auth::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
        }
    }
}

/// POST /auth/signup
///
/// Register a new account and send the email-verification link.
/// The account stays unverified (and cannot log in) until the link is
/// followed.
///
/// # Errors
/// - 400: invalid email/name/password
/// - 409: email already registered
pub async fn signup(
    form: web::Json<SignupRequest>,
    service: web::Data<AuthService>,
    email_client: web::Data<EmailClient>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let (user, verify_token) = service.signup(&form.email, &form.name, &form.password)?;

    let verify_link = format!("{}/auth/verify?token={}", application.public_url, verify_token);
    spawn_verification_email(&email_client, &user.email, &user.name, verify_link);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "user": UserResponse::from(user),
        "detail": "User successfully created. Check your email for confirmation."
    })))
}

/// GET /auth/verify?token=...
///
/// Confirm an email address with a one-time verify-email token.
///
/// # Errors
/// - 401: expired, tampered, wrong-purpose, or already-used token
pub async fn verify_email(
    query: web::Query<VerifyQuery>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    service.verify_email(&query.token)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Email confirmed"
    })))
}

/// POST /auth/resend_verification
///
/// Send a fresh verification email. The response is the same whether the
/// account exists, is already verified, or is unknown.
pub async fn resend_verification(
    form: web::Json<EmailRequest>,
    service: web::Data<AuthService>,
    email_client: web::Data<EmailClient>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if let Some((user, verify_token)) = service.resend_verification(&form.email)? {
        let verify_link = format!("{}/auth/verify?token={}", application.public_url, verify_token);
        spawn_verification_email(&email_client, &user.email, &user.name, verify_link);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Check your email for confirmation."
    })))
}

/// POST /auth/login
///
/// Authenticate with email and password; returns a token pair.
///
/// # Errors
/// - 401: invalid credentials (same message for unknown email and wrong
///   password)
/// - 403: email not verified
/// - 429: too many attempts for this identity in the window
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = service.login(&form.email, &form.password)?;
    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// POST /auth/refresh
///
/// Rotate a refresh token: the presented token is superseded, a new pair
/// is issued.
///
/// # Errors
/// - 401: expired, invalid, wrong-purpose, or already-used refresh token
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = service.refresh(&form.refresh_token)?;
    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// POST /auth/request_password_reset
///
/// Start password recovery. Always answers 202 with the same body, so
/// the endpoint cannot be used to enumerate accounts.
///
/// # Errors
/// - 429: too many attempts for this identity in the window
pub async fn request_password_reset(
    form: web::Json<EmailRequest>,
    service: web::Data<AuthService>,
    email_client: web::Data<EmailClient>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if let Some((user, reset_token)) = service.request_password_reset(&form.email)? {
        let reset_link = format!(
            "{}/auth/confirm_password_reset?token={}",
            application.public_url, reset_token
        );
        let client = email_client.get_ref().clone();
        let recipient = user.email.clone();
        let name = user.name.clone();
        tokio::spawn(async move {
            if let Err(e) = client
                .send_password_reset_email(&recipient, &name, &reset_link)
                .await
            {
                tracing::error!(error = %e, "Failed to send password reset email");
            }
        });
    }

    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "message": "If the account exists, a reset link has been sent."
    })))
}

/// POST /auth/confirm_password_reset
///
/// Finish password recovery with a one-time reset token. All sessions
/// are revoked; the user must log in again with the new password.
///
/// # Errors
/// - 400: new password fails the strength policy
/// - 401: expired, invalid, wrong-purpose, or already-used reset token
pub async fn confirm_password_reset(
    form: web::Json<ConfirmResetRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    service.confirm_password_reset(&form.token, &form.new_password)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password updated. Please log in again."
    })))
}

/// GET /api/me
///
/// Current authenticated user; claims are injected by the access-token
/// middleware.
pub async fn get_current_user(
    claims: web::ReqData<Claims>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = service.current_user(&claims.sub)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

fn spawn_verification_email(
    email_client: &web::Data<EmailClient>,
    recipient: &str,
    name: &str,
    verify_link: String,
) {
    let client = email_client.get_ref().clone();
    let recipient = recipient.to_string();
    let name = name.to_string();
    tokio::spawn(async move {
        if let Err(e) = client
            .send_verification_email(&recipient, &name, &verify_link)
            .await
        {
            tracing::error!(error = %e, "Failed to send verification email");
        }
    });
}
