//! Administrator notification on each accepted submission.
//!
//! Best-effort: one email per accepted submission, no retries. Failures are
//! reported to the orchestrator, which downgrades them to warnings.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::NewSubmission;
use crate::utils::escape_html;

/// Transport or configuration failure while notifying the administrator.
/// Recovered locally by the orchestrator; logged for operations.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email configuration is incomplete")]
    Config,
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build notification message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport failure: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        submission: &NewSubmission,
        submitted_at: &str,
    ) -> Result<(), NotificationError>;
}

/// SMTP notifier. Credentials are checked at send time, not construction
/// time, so the service runs (with partial-success responses) when email is
/// not configured.
pub struct EmailNotifier {
    config: EmailConfig,
    records_url: String,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, base_url: &str) -> Self {
        assert!(!base_url.is_empty(), "Base URL must be configured");
        Self {
            config,
            records_url: format!("{}/records", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(
        &self,
        submission: &NewSubmission,
        submitted_at: &str,
    ) -> Result<(), NotificationError> {
        let (Some(username), Some(password), Some(recipient)) = (
            self.config.username.as_deref(),
            self.config.password.as_deref(),
            self.config.to.as_deref(),
        ) else {
            return Err(NotificationError::Config);
        };

        let from_address: Address = username.parse()?;
        let message = Message::builder()
            .from(Mailbox::new(
                Some(self.config.from_name.clone()),
                from_address,
            ))
            .to(recipient.parse::<Mailbox>()?)
            .subject("New door access issue report")
            .header(ContentType::TEXT_HTML)
            .body(render_admin_email(
                submission,
                submitted_at,
                &self.records_url,
            ))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
            &self.config.smtp_host,
        )?
        .port(self.config.smtp_port)
        .credentials(Credentials::new(username.to_string(), password.to_string()))
        .timeout(Some(self.config.timeout()))
        .build();

        transport.send(message).await?;
        Ok(())
    }
}

fn render_admin_email(submission: &NewSubmission, submitted_at: &str, records_url: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body style=\"font-family: sans-serif; line-height: 1.6;\">\n\
           <h2>New door access issue report</h2>\n\
           <p>A resident reported a door access issue.</p>\n\
           <p><strong>Unit number:</strong> {unit}</p>\n\
           <p><strong>Name:</strong> {name}</p>\n\
           <p><strong>Submitted at:</strong> {submitted_at}</p>\n\
           <p><a href=\"{records_url}\">View all reports</a></p>\n\
         </body>\n\
         </html>\n",
        unit = submission.unit_number,
        name = escape_html(&submission.name),
        submitted_at = escape_html(submitted_at),
        records_url = escape_html(records_url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_credentials() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            to: None,
            from_name: "Door Access System".to_string(),
            timeout_seconds: 20,
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_with_config_error() {
        let notifier = EmailNotifier::new(config_without_credentials(), "http://localhost:8080");
        let submission = NewSubmission {
            unit_number: 101,
            name: "John".to_string(),
        };
        let err = notifier
            .notify(&submission, "2026-03-02 08:30:05")
            .await
            .expect_err("config incomplete");
        assert!(matches!(err, NotificationError::Config));
    }

    #[test]
    fn email_body_escapes_name_and_links_viewer() {
        let submission = NewSubmission {
            unit_number: 101,
            name: "<script>".to_string(),
        };
        let body = render_admin_email(&submission, "2026-03-02 08:30:05", "http://x/records");
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
        assert!(body.contains("http://x/records"));
        assert!(body.contains("101"));
    }
}
