use async_trait::async_trait;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Could not send email to {to}: {reason}")]
    Delivery { to: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Writes outgoing mail to the log instead of delivering it.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self { from: format!("{} <{}>", config.from_name, config.from_email) }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            "outgoing email:\n{}",
            email.body
        );
        Ok(())
    }
}

pub fn reset_password_email(to: &str, reset_url: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Password reset token".to_string(),
        body: format!(
            "You are receiving this email because you (or someone else) has requested the reset \
             of a password. Please make a PUT request to:\n\n{reset_url}\n\nIf you did not request \
             a password reset, please ignore this email."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let mailer = LogMailer::new(&MailConfig {
            from_name: "DevCamper".into(),
            from_email: "noreply@devcamper.io".into(),
        });
        let email = reset_password_email("john@gmail.com", "http://localhost/api/v1/auth/resetpassword/abc");
        assert!(email.body.contains("/resetpassword/abc"));
        assert!(mailer.send(&email).await.is_ok());
    }
}
