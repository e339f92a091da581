//! Email service for sending expiry notification emails.
//!
//! Supports multiple email providers:
//! - `console`: Logs emails to console (development)
//! - `smtp`: Sends via SMTP server (lettre)
//! - `sendgrid`: Uses the SendGrid API

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;
use domain::services::scan::{ExpiryMailer, MailError};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body
    pub body_html: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Console provider - logs the email instead of sending it.
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            from = %self.config.sender_email,
            subject = %message.subject,
            html_chars = message.body_html.len(),
            "Email (console provider)"
        );
        info!(body = %message.body_text, "Email body");

        Ok(())
    }

    /// SMTP provider - sends via SMTP server using lettre.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let from: Mailbox = format!(
            "{} <{}>",
            self.config.sender_name, self.config.sender_email
        )
        .parse()
        .map_err(|_| EmailError::InvalidAddress(self.config.sender_email.clone()))?;

        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(message.to.clone()))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.body_text,
                message.body_html,
            ))
            .map_err(|e| EmailError::SendFailed(format!("Failed to build message: {}", e)))?;

        let mut builder = if self.config.smtp_use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| EmailError::ProviderError(format!("SMTP relay setup failed: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        };
        builder = builder.port(self.config.smtp_port);

        if !self.config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ));
        }

        let transport: AsyncSmtpTransport<Tokio1Executor> = builder.build();

        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP send failed: {}", e)))?;

        info!(
            to = %message.to,
            smtp_host = %self.config.smtp_host,
            "Email sent via SMTP"
        );
        Ok(())
    }

    /// SendGrid provider - sends via the SendGrid v3 mail API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let response = reqwest::Client::new()
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&self.sendgrid_payload(&message))
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = %status, detail = %detail, "SendGrid API error");
            return Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, detail
            )));
        }

        info!(to = %message.to, "Email sent via SendGrid");
        Ok(())
    }

    fn sendgrid_payload(&self, message: &EmailMessage) -> serde_json::Value {
        serde_json::json!({
            "personalizations": [{
                "to": [{ "email": message.to }]
            }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [
                { "type": "text/plain", "value": message.body_text },
                { "type": "text/html", "value": message.body_html }
            ]
        })
    }
}

#[async_trait]
impl ExpiryMailer for EmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let message = EmailMessage {
            to: recipient.to_string(),
            subject: subject.to_string(),
            body_text: text_body.to_string(),
            body_html: html_body.to_string(),
        };

        EmailService::send(self, message).await.map_err(|e| match e {
            EmailError::InvalidAddress(addr) => MailError::InvalidRecipient(addr),
            other => MailError::Transport(other.to_string()),
        })
    }
}
