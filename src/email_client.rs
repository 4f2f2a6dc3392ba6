use serde::Serialize;

use crate::error::EmailError;
use crate::validators::is_valid_email;

/// HTTP client for the mail delivery provider
///
/// Sends are fire-and-forget from the route layer: a provider outage is
/// logged and never fails the originating request.
#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: SenderEmail,
}

/// Validated sender address
#[derive(Clone)]
pub struct SenderEmail(String);

impl SenderEmail {
    pub fn parse(s: String) -> Result<Self, EmailError> {
        let email = is_valid_email(&s).map_err(|e| EmailError::InvalidRecipient(e.to_string()))?;
        Ok(Self(email))
    }

    pub fn inner(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: String,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(base_url: String, sender: SenderEmail, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url,
            sender,
        }
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
    ) -> Result<(), EmailError> {
        let url = format!("{}/email", self.base_url);
        let request = SendEmailRequest {
            from: self.sender.inner().to_string(),
            to: recipient.to_string(),
            subject: subject.to_string(),
            html: html_content.to_string(),
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }

    pub async fn send_verification_email(
        &self,
        recipient: &str,
        name: &str,
        verify_link: &str,
    ) -> Result<(), EmailError> {
        let html = format!(
            "<p>Hello {},</p>\
             <p>Welcome! Please confirm your email address by clicking the link below.</p>\
             <p><a href=\"{}\">Confirm email</a></p>",
            name, verify_link
        );
        self.send_email(recipient, "Confirm your email", &html).await
    }

    pub async fn send_password_reset_email(
        &self,
        recipient: &str,
        name: &str,
        reset_link: &str,
    ) -> Result<(), EmailError> {
        let html = format!(
            "<p>Hello {},</p>\
             <p>A password reset was requested for your account. If this was you, \
             follow the link below. The link expires shortly.</p>\
             <p><a href=\"{}\">Reset password</a></p>\
             <p>If you did not request this, you can ignore this email.</p>",
            name, reset_link
        );
        self.send_email(recipient, "Reset your password", &html).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_parse_valid_email() {
        let sender = SenderEmail::parse("noreply@example.com".to_string());
        assert!(sender.is_ok());
    }

    #[test]
    fn test_sender_parse_invalid_email() {
        let sender = SenderEmail::parse("not-an-email".to_string());
        assert!(sender.is_err());
    }
}
