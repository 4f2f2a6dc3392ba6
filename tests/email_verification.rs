//! Integration tests for the email verification flow

use std::net::TcpListener;
use std::sync::Arc;

use contactly::auth::{issue_token, AuthService, TokenPurpose};
use contactly::configuration::{ApplicationSettings, JwtSettings, RateLimitSettings};
use contactly::contacts::ContactStore;
use contactly::email_client::{EmailClient, SenderEmail};
use contactly::rate_limit::RateLimiter;
use contactly::startup::run;
use contactly::store::UserStore;
use serde_json::{json, Value};

pub struct TestApp {
    pub address: String,
    pub jwt: JwtSettings,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let jwt = JwtSettings {
        secret: "integration-test-secret-32-characters-xx".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        verify_token_expiry: 86400,
        reset_token_expiry: 900,
        issuer: "contactly-test".to_string(),
    };
    let application = ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port,
        public_url: address.clone(),
    };
    let email_client = EmailClient::new(
        "http://127.0.0.1:9".to_string(),
        SenderEmail::parse("noreply@example.com".to_string()).unwrap(),
        reqwest::Client::new(),
    );
    let auth_service = AuthService::new(
        Arc::new(UserStore::new()),
        RateLimiter::new(&RateLimitSettings {
            max_attempts: 100,
            window_seconds: 3600,
        }),
        jwt.clone(),
    );

    let server = run(
        listener,
        auth_service,
        ContactStore::new(),
        email_client,
        application,
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, jwt }
}

async fn signup(client: &reqwest::Client, app: &TestApp, email: &str) {
    let response = client
        .post(&format!("{}/auth/signup", &app.address))
        .json(&json!({ "name": "Test User", "email": email, "password": "SecurePass123" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn verify_confirms_email_exactly_once() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    signup(&client, &app, "john@example.com").await;
    let token = issue_token("john@example.com", TokenPurpose::VerifyEmail, 3600, &app.jwt)
        .expect("Failed to mint token");

    let response = client
        .get(&format!("{}/auth/verify?token={}", &app.address, token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email confirmed");

    // One-time use: the same link again is rejected
    let response = client
        .get(&format!("{}/auth/verify?token={}", &app.address, token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "TOKEN_ALREADY_USED");
}

#[tokio::test]
async fn verify_rejects_garbage_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/auth/verify?token=not.a.token", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn verify_rejects_expired_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    signup(&client, &app, "john@example.com").await;
    let expired = issue_token("john@example.com", TokenPurpose::VerifyEmail, -60, &app.jwt)
        .expect("Failed to mint token");

    let response = client
        .get(&format!("{}/auth/verify?token={}", &app.address, expired))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn verify_rejects_token_with_wrong_purpose() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    signup(&client, &app, "john@example.com").await;
    let access = issue_token("john@example.com", TokenPurpose::Access, 900, &app.jwt)
        .expect("Failed to mint token");

    let response = client
        .get(&format!("{}/auth/verify?token={}", &app.address, access))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "TOKEN_WRONG_PURPOSE");
}

#[tokio::test]
async fn resend_verification_answers_identically_for_unknown_accounts() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    signup(&client, &app, "pending@example.com").await;

    for email in ["pending@example.com", "ghost@example.com"] {
        let response = client
            .post(&format!("{}/auth/resend_verification", &app.address))
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Check your email for confirmation.");
    }
}
